//! GPIO / peripheral pin assignments for the probe bridge board.
//!
//! Single source of truth: every driver references this module rather than
//! hard-coding pin numbers.  Both bindings are fixed at build time.
//!
//! The board is an ESP32-S3 DevKitC, but the pins are picked to stay clear
//! of SPI flash/PSRAM, strapping, USB-JTAG and UART0 lines on every chip
//! ESP-IDF targets (ESP32, S2, S3, C3, C6).  The original ESP32 is the one
//! exception: GPIO5 straps SDIO timing there, so the touch line moves to
//! GPIO13.  `esp32` is the MCU cfg emitted through `build.rs`.

// ---------------------------------------------------------------------------
// Probe servo (BLTouch-style control line)
// ---------------------------------------------------------------------------

/// LEDC PWM output driving the probe's servo control wire.
pub const SERVO_PWM_GPIO: i32 = 4;

// ---------------------------------------------------------------------------
// Touch sense
// ---------------------------------------------------------------------------

/// Digital input: probe trigger line.  Internal pull-up, a rising edge
/// means the probe pin touched the surface.
#[cfg(not(esp32))]
pub const TOUCH_IRQ_GPIO: i32 = 5;
/// Digital input: probe trigger line (original ESP32 board wiring).
#[cfg(esp32)]
pub const TOUCH_IRQ_GPIO: i32 = 13;

// ---------------------------------------------------------------------------
// Servo PWM configuration
// ---------------------------------------------------------------------------

/// Standard hobby-servo frame rate.
pub const SERVO_PWM_FREQ_HZ: u32 = 50;
/// LEDC timer resolution (bits).  14-bit gives ~1.2 µs steps at 50 Hz.
pub const SERVO_PWM_RESOLUTION_BITS: u32 = 14;
/// One PWM frame at [`SERVO_PWM_FREQ_HZ`].
pub const SERVO_PERIOD_US: u32 = 1_000_000 / SERVO_PWM_FREQ_HZ;
/// Pulse width commanding 0°.
pub const SERVO_MIN_PULSE_US: u32 = 544;
/// Pulse width commanding 180°.
pub const SERVO_MAX_PULSE_US: u32 = 2_400;
