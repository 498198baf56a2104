use pretty_assertions::assert_eq;
use segue_domain_score::{NoteSpec, ScoreBuilder, ScoreCursor, ScoreError};
use segue_ports::score::{CursorPort, TieRef};
use segue_ports::types::{Fraction, InstrumentId, VoiceId};

const PIANO: InstrumentId = InstrumentId(1);
const RIGHT: VoiceId = VoiceId(1);
const LEFT: VoiceId = VoiceId(2);

fn piano() -> ScoreBuilder {
    let mut builder = ScoreBuilder::new(4);
    builder
        .title("Test")
        .instrument(PIANO, "Piano", &[RIGHT, LEFT]);
    builder
}

#[test]
fn tie_links_both_notes_to_start() {
    let mut builder = piano();
    let first = builder.group(&[NoteSpec::note(60, Fraction::new(1, 4), PIANO, RIGHT)]);
    let second = builder.group(&[NoteSpec::note(60, Fraction::new(1, 8), PIANO, RIGHT)]);
    builder.tie(first[0], second[0]).expect("tie ok");
    let score = builder.build().expect("build ok");

    let expected = Some(TieRef {
        start: first[0],
        following_length: Some(Fraction::new(1, 8)),
    });
    assert_eq!(score.groups[0].notes[0].tie, expected);
    assert_eq!(score.groups[1].notes[0].tie, expected);
    assert!(score.groups[0].notes[0].starts_tie());
    assert!(!score.groups[1].notes[0].starts_tie());
}

#[test]
fn tie_rejects_note_already_tied() {
    let mut builder = piano();
    let a = builder.group(&[NoteSpec::note(60, Fraction::new(1, 4), PIANO, RIGHT)]);
    let b = builder.group(&[NoteSpec::note(60, Fraction::new(1, 4), PIANO, RIGHT)]);
    let c = builder.group(&[NoteSpec::note(60, Fraction::new(1, 4), PIANO, RIGHT)]);
    builder.tie(a[0], b[0]).expect("tie ok");

    assert_eq!(builder.tie(b[0], c[0]), Err(ScoreError::AlreadyTied(b[0])));
}

#[test]
fn build_rejects_undeclared_voice() {
    let mut builder = piano();
    let ids = builder.group(&[NoteSpec::note(60, Fraction::new(1, 4), PIANO, VoiceId(9))]);

    assert_eq!(
        builder.build(),
        Err(ScoreError::UndeclaredVoice {
            note: ids[0],
            instrument: PIANO,
            voice: VoiceId(9),
        })
    );
}

#[test]
fn cursor_walks_groups_sequentially() {
    let mut builder = piano();
    builder.group(&[
        NoteSpec::note(60, Fraction::new(1, 4), PIANO, RIGHT),
        NoteSpec::note(48, Fraction::new(1, 2), PIANO, LEFT),
    ]);
    builder.group(&[NoteSpec::rest(Fraction::new(1, 4), PIANO, RIGHT)]);
    let score = builder.build().expect("build ok");
    let cursor = ScoreCursor::new(&score);

    assert_eq!(cursor.current_notes().len(), 2);
    cursor.next();
    assert!(cursor.current_notes()[0].is_rest());
    cursor.next();
    assert!(cursor.end_reached());
    assert!(cursor.current_notes().is_empty());

    cursor.next();
    assert_eq!(cursor.position(), 2);

    cursor.reset();
    assert_eq!(cursor.position(), 0);
    assert!(!cursor.is_visible());
    cursor.show();
    assert!(cursor.is_visible());
}
