//! A simulated charging session: a car plugs in, charges, and leaves, forever.

use evsedash_domain::state::{ChargerMode, DeviceState};

/// Nominal phase voltage, in volts.
const NOMINAL_VOLTAGE: f64 = 230.0;

/// Modes visited by the cycle and how many ticks each one lasts.
const PHASES: [(ChargerMode, u32); 4] = [
    (ChargerMode::NotConnected, 5),
    (ChargerMode::Ready, 3),
    (ChargerMode::Charging, 20),
    (ChargerMode::Ready, 3),
];

/// Position inside the repeating charging session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChargingCycle {
    step: u32,
}

impl ChargingCycle {
    fn len() -> u32 {
        PHASES.iter().map(|(_, ticks)| ticks).sum()
    }

    /// Move one tick forward, wrapping around at the end of the session.
    pub fn advance(&mut self) {
        self.step = (self.step + 1) % Self::len();
    }

    #[must_use]
    pub fn mode(self) -> ChargerMode {
        let mut remaining = self.step;
        for (mode, ticks) in PHASES {
            if remaining < ticks {
                return mode;
            }
            remaining -= ticks;
        }
        ChargerMode::NotConnected
    }

    /// State document for the current tick. Phases draw `charging_current`
    /// while charging and nothing otherwise.
    #[must_use]
    pub fn state(self, charging_current: f64) -> DeviceState {
        let mode = self.mode();
        let current = if mode.is_charging() {
            charging_current
        } else {
            0.0
        };
        // Small ripple so successive polls are distinguishable.
        let voltage = NOMINAL_VOLTAGE + f64::from(self.step % 4) * 0.5;

        DeviceState {
            mode: Some(mode),
            error: Some(0),
            l1_current: Some(current),
            l2_current: Some(current),
            l3_current: Some(current),
            l1_voltage: Some(voltage),
            l2_voltage: Some(voltage - 1.0),
            l3_voltage: Some(voltage + 1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn advanced(ticks: u32) -> ChargingCycle {
        let mut cycle = ChargingCycle::default();
        for _ in 0..ticks {
            cycle.advance();
        }
        cycle
    }

    #[test]
    fn should_start_unplugged() {
        let state = ChargingCycle::default().state(16.0);
        assert_eq!(state.mode, Some(ChargerMode::NotConnected));
        assert_eq!(state.currents(), [Some(0.0); 3]);
    }

    #[test]
    fn should_draw_charging_current_while_charging() {
        let cycle = advanced(8);
        assert_eq!(cycle.mode(), ChargerMode::Charging);
        assert_eq!(cycle.state(10.0).currents(), [Some(10.0); 3]);
    }

    #[test]
    fn should_wrap_around_after_full_session() {
        assert_eq!(advanced(ChargingCycle::len()), ChargingCycle::default());
    }
}
