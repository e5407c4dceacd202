use bon::Builder;

use crate::{
    forecast::{BatteryModel, ChargeOutcome},
    quantity::energy::Kwh,
};

/// Battery parameters, constant for a planning run.
#[derive(Builder, Clone, Copy, Debug)]
pub struct BatteryParameters {
    pub capacity: Kwh,
    pub grid_charge_per_segment: Kwh,
}

/// Lossless battery model.
///
/// Charge accumulates up to the capacity and the overflow is wastage; no
/// round-trip efficiency is modelled at this layer.
#[derive(Clone, Copy, Debug)]
pub struct SimpleBattery {
    parameters: BatteryParameters,
}

impl SimpleBattery {
    #[must_use]
    pub const fn new(parameters: BatteryParameters) -> Self {
        Self { parameters }
    }
}

impl BatteryModel for SimpleBattery {
    fn capacity(&self) -> Kwh {
        self.parameters.capacity
    }

    fn grid_charge_per_segment(&self) -> Kwh {
        self.parameters.grid_charge_per_segment
    }

    fn predict(&self, start_soc: Kwh, available: Kwh) -> ChargeOutcome {
        let offered = start_soc + available;
        ChargeOutcome {
            end_soc: offered.min(self.parameters.capacity),
            wastage: offered.saturating_sub(self.parameters.capacity),
        }
    }
}
