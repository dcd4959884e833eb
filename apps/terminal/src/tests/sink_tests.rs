use super::*;

fn group(id: u64, title: Option<&str>, lines: &[&str]) -> LogGroup {
    LogGroup {
        id: GroupId(id),
        title: title.map(str::to_string),
        created_at: Default::default(),
        entries: lines.iter().map(|line| LogEntry::classified(*line)).collect(),
    }
}

fn output(sink: TerminalSink<Vec<u8>>) -> String {
    String::from_utf8(sink.into_inner()).expect("utf8")
}

#[test]
fn replayed_transcript_prints_only_new_lines() {
    let sink = TerminalSink::new(Vec::new());
    sink.clear();
    sink.append_group(&group(1, Some("System"), &["【系统】one", "【系统】two"]));
    sink.clear();
    sink.append_group(&group(2, Some("System"), &["【系统】one", "【系统】two"]));
    sink.append_group(&group(3, Some("Combat Log"), &["【战斗】a wolf bites"]));

    let text = output(sink);
    assert_eq!(text.matches("【系统】one").count(), 1);
    assert_eq!(text.matches("-- System --").count(), 1);
    assert!(text.contains("-- Combat Log --\n  [combat] 【战斗】a wolf bites"));
}

#[test]
fn player_echoes_are_not_printed() {
    let sink = TerminalSink::new(Vec::new());
    sink.append_entry(GroupId(1), &LogEntry::new(Category::Player, "➤ status"));
    sink.append_group(&group(2, Some("Player Actions"), &["➤ status"]));
    assert!(!output(sink).contains("➤ status"));
}

#[test]
fn incremental_group_prints_header_then_entries() {
    let sink = TerminalSink::new(Vec::new());
    sink.append_group(&group(1, Some("Tutorial"), &[]));
    sink.append_entry(GroupId(1), &LogEntry::new(Category::Tip, "[提示] try train"));
    assert_eq!(output(sink), "-- Tutorial --\n  [hint] [提示] try train\n");
}

#[test]
fn choices_are_numbered_from_one() {
    let sink = TerminalSink::new(Vec::new());
    sink.present_choices(
        "Pick one",
        &[PathChoice {
            label: "Path of the Sword",
            summary: "sharp",
        }],
    );
    assert_eq!(output(sink), "Pick one\n  !1 Path of the Sword (sharp)\n");
}

#[test]
fn status_panel_shows_bonuses() {
    use session_core::status::Meter;

    let status = PlayerStatus {
        name: "Lin".into(),
        realm: "Qi Refining, Stage 1".into(),
        cultivation: Meter { current: 10.0, max: 100.0 },
        health: Meter { current: 20.0, max: 100.0 },
        mana: Meter { current: 5.0, max: 50.0 },
        stamina: Meter { current: 30.0, max: 30.0 },
        attack: 12.0,
        defense: 5.0,
        attack_bonus: 3.0,
        defense_bonus: -1.0,
        location: "Qingyun City".into(),
        gold: 7.0,
    };
    let panel = format_status(&status);
    assert!(panel.contains("attack 12(+3)"));
    assert!(panel.contains("defense 5(-1)"));
    assert!(panel.contains("health 20/100"));
}
