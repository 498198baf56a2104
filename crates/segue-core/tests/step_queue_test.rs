mod common;

use common::note;
use pretty_assertions::assert_eq;
use segue_core::StepQueue;
use segue_ports::types::NoteId;

fn ids(queue: &StepQueue) -> Vec<(i64, Vec<u64>)> {
    queue
        .iter()
        .map(|step| (step.tick, step.notes.iter().map(|n| n.id.0).collect()))
        .collect()
}

#[test]
fn add_merges_notes_on_same_tick_in_call_order() {
    let mut queue = StepQueue::new();
    queue.add(256, note(1, 60));
    queue.add(0, note(2, 62));
    queue.add(256, note(3, 64));
    queue.add(0, note(4, 65));
    queue.add(256, note(5, 67));

    assert_eq!(queue.len(), 2);
    assert_eq!(ids(&queue), vec![(256, vec![1, 3, 5]), (0, vec![2, 4])]);
}

#[test]
fn sort_orders_by_tick_and_is_idempotent() {
    let mut queue = StepQueue::new();
    for (id, tick) in [(1, 768), (2, 0), (3, 512), (4, 256), (5, 0)] {
        queue.add(tick, note(id, 60));
    }

    queue.sort();
    let once = ids(&queue);
    assert_eq!(
        once,
        vec![(0, vec![2, 5]), (256, vec![4]), (512, vec![3]), (768, vec![1])]
    );

    queue.sort();
    assert_eq!(ids(&queue), once);

    let ticks: Vec<i64> = (&queue).into_iter().map(|step| step.tick).collect();
    assert!(ticks.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn remove_drops_exact_tick_only() {
    let mut queue = StepQueue::new();
    queue.add(0, note(1, 60));
    queue.add(256, note(2, 62));

    assert!(queue.remove(128).is_none());
    let removed = queue.remove(0).expect("step at tick 0");
    assert_eq!(removed.notes[0].id, NoteId(1));
    assert_eq!(queue.len(), 1);
    assert_eq!(queue.get(0).map(|step| step.tick), Some(256));
}
