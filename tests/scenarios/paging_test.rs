/*!
 * Paging Scenarios
 * Serialized swap-ins and request/cancel round-trips
 */

use super::common::{quiet_sim, toggle};
use os_game_kernel::{
    Action, Event, EventMonitor, ExternalInput, InputCommand, MemoryConfig, PageKey, PageManager,
};
use pretty_assertions::assert_eq;

#[test]
fn test_two_disk_pages_swap_in_one_after_another() {
    let mut pm = PageManager::new(&MemoryConfig {
        ram_rows: 1,
        disk_rows: 1,
        slots_per_row: 2,
        swap_delay_ms: 100,
        parallel_swaps: 1,
    });
    let mut ev = EventMonitor::new();

    // fill RAM with a placeholder process so pid 1 lands on disk
    pm.create_page(PageKey::new(9, 0), false, &mut ev);
    pm.create_page(PageKey::new(9, 1), false, &mut ev);
    let a = PageKey::new(1, 0);
    let b = PageKey::new(1, 1);
    pm.create_page(a, true, &mut ev);
    pm.create_page(b, true, &mut ev);
    pm.delete_page(PageKey::new(9, 0), &mut ev);
    pm.delete_page(PageKey::new(9, 1), &mut ev);
    assert!(pm.page(a).unwrap().on_disk && pm.page(b).unwrap().on_disk);

    pm.request_swap(a, false, &mut ev);
    pm.request_swap(b, false, &mut ev);
    ev.drain();

    let mut timeline = Vec::new();
    for now in (0..=300).step_by(50) {
        pm.advance_swap_queues(now, &mut ev);
        assert!(pm.stats().swaps_in_progress <= 1);
        for event in ev.drain() {
            timeline.push((now, event));
        }
    }

    assert_eq!(
        timeline,
        vec![
            (0, Event::PageSwapStart { pid: 1, idx: 0 }),
            (100, Event::PageSwap { pid: 1, idx: 0, swap: false }),
            (100, Event::PageSwapStart { pid: 1, idx: 1 }),
            (200, Event::PageSwap { pid: 1, idx: 1, swap: false }),
        ]
    );
}

#[test]
fn test_request_then_cancel_is_invisible() {
    let mut sim = quiet_sim(1, 5_000);
    sim.spawn_process();
    sim.update(0, toggle(1));
    let key = PageKey::new(1, 0);
    let before = sim.pages().page(key).cloned();
    assert!(before.is_some());
    let queued_before = sim.pages().stats();

    let page = InputCommand::Apply(Action::page(key));
    sim.update(10, ExternalInput::none().with(page).with(page));

    assert_eq!(sim.pages().page(key).cloned(), before);
    assert_eq!(sim.pages().stats(), queued_before);
}

#[test]
fn test_swap_row_requests_every_page_in_the_row() {
    let mut sim = quiet_sim(1, 5_000);
    sim.spawn_process();
    sim.update(0, toggle(1));
    let pages = sim.processes().get(1).unwrap().pages().to_vec();
    sim.drain_events();

    sim.update(
        10,
        ExternalInput::none().with(InputCommand::swap_row(PageKey::new(1, 0))),
    );
    let queued = sim
        .drain_events()
        .into_iter()
        .filter(|e| matches!(e, Event::PageSwapQueue { waiting: true, .. }))
        .count();
    assert_eq!(queued, pages.len());
}
