use super::*;

#[test]
fn full_script_walks_every_step_in_order() {
    let script = [
        (TutorialStep::Welcome, TutorialTrigger::SessionStart, 1000),
        (TutorialStep::ChoosePath, TutorialTrigger::PathChosen, 1000),
        (TutorialStep::CheckStatus, TutorialTrigger::Command("status"), 1000),
        (TutorialStep::Train, TutorialTrigger::Command("train"), 3000),
        (TutorialStep::Explore, TutorialTrigger::Command("explore"), 2000),
    ];
    for (step, trigger, delay) in script {
        let transition = transition_for(step, trigger).expect("transition");
        assert_eq!(transition.from, step);
        assert_eq!(Some(transition.to), step.next());
        assert_eq!(transition.delay, Duration::from_millis(delay));
    }
}

#[test]
fn out_of_order_commands_are_ignored() {
    assert_eq!(
        transition_for(TutorialStep::CheckStatus, TutorialTrigger::Command("train")),
        None
    );
    assert_eq!(
        transition_for(TutorialStep::Train, TutorialTrigger::Command("explore")),
        None
    );
    assert_eq!(
        transition_for(TutorialStep::Complete, TutorialTrigger::Command("status")),
        None
    );
    assert_eq!(
        transition_for(TutorialStep::CheckStatus, TutorialTrigger::SessionStart),
        None
    );
}

#[test]
fn command_matching_is_case_insensitive_and_accepts_aliases() {
    for cmd in ["STATUS", " Status ", "s", "状态"] {
        assert!(
            transition_for(TutorialStep::CheckStatus, TutorialTrigger::Command(cmd)).is_some(),
            "{cmd:?}"
        );
    }
    for cmd in ["Cultivate", "c", "修炼"] {
        assert!(transition_for(TutorialStep::Train, TutorialTrigger::Command(cmd)).is_some());
    }
    assert!(transition_for(TutorialStep::CheckStatus, TutorialTrigger::Command("status now")).is_none());
}

#[test]
fn only_the_final_reveal_unlocks_an_achievement() {
    let last = transition_for(TutorialStep::Explore, TutorialTrigger::Command("e")).expect("last");
    assert_eq!(
        last.reveal.achievement(),
        Some(Achievement::new("First Steps", "Complete the new player tutorial"))
    );
    let first = transition_for(TutorialStep::Welcome, TutorialTrigger::SessionStart).expect("first");
    assert!(first.reveal.present_choices);
    assert!(first.reveal.achievement().is_none());
}
