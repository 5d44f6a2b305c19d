#![no_std]
#![no_main]

// Board wiring for the DESPI-M02 (STM32F103VE): green on PB14, red on PB10,
// pedestrian button on PE11 to ground.

use crossing::{CONFIG, Controller, Crossing, Lamps, supervise};
use defmt::{error, info, unwrap};
use embassy_executor::Spawner;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_sync::blocking_mutex::raw::ThreadModeRawMutex;
use panic_halt as _;
use static_cell::StaticCell;

type BoardCrossing = Crossing<ThreadModeRawMutex, Output<'static>>;

static CROSSING: StaticCell<BoardCrossing> = StaticCell::new();

#[embassy_executor::task]
async fn pedestrian_task(crossing: &'static BoardCrossing, button: Input<'static>) {
    supervise("pedestrian", crossing.pedestrian_monitor(button)).await
}

#[embassy_executor::task]
async fn green_task(crossing: &'static BoardCrossing) {
    supervise("green", crossing.green_phase()).await
}

#[embassy_executor::task]
async fn yellow_task(crossing: &'static BoardCrossing) {
    supervise("yellow", crossing.yellow_phase()).await
}

#[embassy_executor::task]
async fn red_task(crossing: &'static BoardCrossing) {
    supervise("red", crossing.red_phase()).await
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    rtt_target::rtt_init_defmt!();

    let peripherals = embassy_stm32::init(Default::default());

    let lamps = Lamps::new(
        Output::new(peripherals.PB14, Level::Low, Speed::Low),
        Output::new(peripherals.PB10, Level::Low, Speed::Low),
    );
    let button = Input::new(peripherals.PE11, Pull::Up);

    info!("starting in {} mode", CONFIG.mode);
    match Controller::new(&CONFIG, lamps, button) {
        Controller::Day(day) => {
            let (crossing, button) = day.into_parts();
            let crossing: &'static BoardCrossing = CROSSING.init(crossing);

            unwrap!(spawner.spawn(pedestrian_task(crossing, button)));
            unwrap!(spawner.spawn(green_task(crossing)));
            unwrap!(spawner.spawn(yellow_task(crossing)));
            unwrap!(spawner.spawn(red_task(crossing)));
        }
        Controller::Night(night) => {
            // Blocks the main task for good.
            if let Err(err) = night.run().await {
                error!("night mode stopped: {}", err);
            }
        }
    }
}
