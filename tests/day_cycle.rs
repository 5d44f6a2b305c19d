mod common;

use common::{Aspect, advance_to, day_crossing, run_scenario, settle};

#[test]
fn undisturbed_cycle_runs_green_yellow_red_every_eight_seconds() {
    let (panel, _button, crossing, input) = day_crossing();

    run_scenario(&crossing, input, async {
        settle().await;
        advance_to(24_000).await;
    });

    assert_eq!(
        panel.aspects(),
        vec![
            (0, Aspect::Green),
            (3_000, Aspect::Yellow),
            (4_000, Aspect::Red),
            (8_000, Aspect::Green),
            (11_000, Aspect::Yellow),
            (12_000, Aspect::Red),
            (16_000, Aspect::Green),
            (19_000, Aspect::Yellow),
            (20_000, Aspect::Red),
            (24_000, Aspect::Green),
        ]
    );
    assert!(!crossing.request().is_pending());
}
