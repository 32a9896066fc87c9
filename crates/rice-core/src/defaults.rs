//! Per-acre and per-cwt unit cost coefficients.

use crate::{within_range, ConfigurationError, ValidationError, MAX_UNIT_COST};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Cost table categories, used to address lines when overriding.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    /// Main crop variable costs.
    MainCrop,
    /// Ratoon crop variable costs.
    RatoonCrop,
    /// Annual fixed costs.
    Fixed,
}

impl fmt::Display for CostCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CostCategory::MainCrop => "main_crop",
            CostCategory::RatoonCrop => "ratoon_crop",
            CostCategory::Fixed => "fixed",
        })
    }
}

/// Line-item overrides keyed by category, then line name.
pub type CostOverrides = BTreeMap<CostCategory, BTreeMap<String, Decimal>>;

/// Variable unit costs for a single crop.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CropCostSheet {
    /// Constant lines in USD per acre.
    pub per_acre: BTreeMap<String, Decimal>,
    /// Yield-dependent lines in USD per cwt harvested.
    pub per_cwt: BTreeMap<String, Decimal>,
}

impl CropCostSheet {
    fn from_lines(per_acre: &[(&str, Decimal)], per_cwt: &[(&str, Decimal)]) -> Self {
        let collect = |lines: &[(&str, Decimal)]| {
            lines
                .iter()
                .map(|(name, cost)| (name.to_string(), *cost))
                .collect::<BTreeMap<_, _>>()
        };
        Self {
            per_acre: collect(per_acre),
            per_cwt: collect(per_cwt),
        }
    }

    /// Sum of the constant per-acre lines.
    pub fn per_acre_sum(&self) -> Decimal {
        self.per_acre.values().sum()
    }

    /// Sum of the per-cwt lines.
    pub fn per_cwt_sum(&self) -> Decimal {
        self.per_cwt.values().sum()
    }

    fn set(&mut self, line: &str, value: Decimal) -> bool {
        if let Some(slot) = self.per_acre.get_mut(line) {
            *slot = value;
            return true;
        }
        if let Some(slot) = self.per_cwt.get_mut(line) {
            *slot = value;
            return true;
        }
        false
    }
}

/// Annual fixed costs in USD per acre.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FixedCostSheet {
    pub crop_insurance: Decimal,
    /// General and administrative overhead.
    pub g_a_overhead: Decimal,
    pub pickup_mileage_charge: Decimal,
    pub machinery_depreciation: Decimal,
    pub equipment_investment_interest: Decimal,
    /// Management fee charged for every farm.
    pub management_fee_main_crop: Decimal,
    /// Additional management fee when a ratoon crop is grown.
    pub management_fee_ratoon_crop: Decimal,
}

impl FixedCostSheet {
    /// All lines with their names, in reporting order.
    pub fn lines(&self) -> [(&'static str, Decimal); 7] {
        [
            ("crop_insurance", self.crop_insurance),
            ("g_a_overhead", self.g_a_overhead),
            ("pickup_mileage_charge", self.pickup_mileage_charge),
            ("machinery_depreciation", self.machinery_depreciation),
            ("equipment_investment_interest", self.equipment_investment_interest),
            ("management_fee_main_crop", self.management_fee_main_crop),
            ("management_fee_ratoon_crop", self.management_fee_ratoon_crop),
        ]
    }

    fn set(&mut self, line: &str, value: Decimal) -> bool {
        let slot = match line {
            "crop_insurance" => &mut self.crop_insurance,
            "g_a_overhead" => &mut self.g_a_overhead,
            "pickup_mileage_charge" => &mut self.pickup_mileage_charge,
            "machinery_depreciation" => &mut self.machinery_depreciation,
            "equipment_investment_interest" => &mut self.equipment_investment_interest,
            "management_fee_main_crop" => &mut self.management_fee_main_crop,
            "management_fee_ratoon_crop" => &mut self.management_fee_ratoon_crop,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// Immutable table of default unit costs handed to the model by the caller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostDefaults {
    pub main_crop: CropCostSheet,
    pub ratoon_crop: CropCostSheet,
    pub fixed: FixedCostSheet,
}

impl Default for CostDefaults {
    fn default() -> Self {
        Self::agrilife()
    }
}

impl CostDefaults {
    /// Texas AgriLife long-grain rice budget figures.
    pub fn agrilife() -> Self {
        let per_cwt = [
            ("hauling_per_cwt", dec!(0.48)),
            ("drying_per_cwt", dec!(1.33)),
            ("storage_per_cwt", dec!(0.34)),
            ("commission_per_cwt", dec!(0.08)),
            ("check_off_per_cwt", dec!(0.08)),
        ];
        let main_crop = CropCostSheet::from_lines(
            &[
                ("seed", dec!(46.75)),
                ("fertilizer_materials", dec!(192.29)),
                ("custom_fertilizer_application", dec!(21.47)),
                ("herbicides_materials", dec!(51.36)),
                ("insecticides_materials", dec!(13.64)),
                ("fungicides_materials", dec!(31.78)),
                ("other_chemicals_surfactants", dec!(4.46)),
                // 4.5 treated acres per crop acre
                ("custom_aerial_application", dec!(37.21)),
                // 2.75 acre-feet
                ("water_cost_volume_based", dec!(43.45)),
                ("base_water_charge_fixed", dec!(70.30)),
                ("irrigation_labor", dec!(27.48)),
                ("machinery_labor_pre_harvest", dec!(15.32)),
                ("diesel_fuel_pre_harvest", dec!(18.64)),
                ("repairs_maintenance_machinery_pre_harvest", dec!(40.18)),
                ("other_field_supplies", dec!(10.07)),
                ("interest_on_operating_capital", dec!(44.05)),
            ],
            &per_cwt,
        );
        let ratoon_crop = CropCostSheet::from_lines(
            &[
                ("fertilizer", dec!(40.62)),
                ("custom_top_dress", dec!(9.54)),
                ("insecticide_stinkbug", dec!(4.56)),
                ("water_cost_irrigation_labor", dec!(48.32)),
                ("machinery_labor_fuel_rm", dec!(14.73)),
                ("interest_on_operating_capital", dec!(1.55)),
            ],
            &per_cwt,
        );
        let fixed = FixedCostSheet {
            crop_insurance: dec!(11.00),
            g_a_overhead: dec!(11.13),
            pickup_mileage_charge: dec!(19.61),
            machinery_depreciation: dec!(44.28),
            equipment_investment_interest: dec!(28.46),
            management_fee_main_crop: dec!(56.00),
            management_fee_ratoon_crop: dec!(10.00),
        };
        Self {
            main_crop,
            ratoon_crop,
            fixed,
        }
    }

    /// Return a copy of this table with the given lines replaced.
    ///
    /// Every overridden line must already exist in its category.
    pub fn with_overrides(&self, overrides: &CostOverrides) -> Result<Self, ConfigurationError> {
        let mut table = self.clone();
        for (&category, lines) in overrides {
            for (line, &value) in lines {
                let known = match category {
                    CostCategory::MainCrop => table.main_crop.set(line, value),
                    CostCategory::RatoonCrop => table.ratoon_crop.set(line, value),
                    CostCategory::Fixed => table.fixed.set(line, value),
                };
                if !known {
                    return Err(ConfigurationError::UnknownCostLine {
                        category,
                        line: line.clone(),
                    });
                }
                debug!(%category, line = %line, %value, "cost default overridden");
            }
        }
        Ok(table)
    }
}

/// Validate that every unit cost in the table is non-negative and within
/// [`MAX_UNIT_COST`].
pub fn validate_cost_defaults(defaults: &CostDefaults) -> Result<(), ValidationError> {
    let crops = [
        (CostCategory::MainCrop, &defaults.main_crop),
        (CostCategory::RatoonCrop, &defaults.ratoon_crop),
    ];
    for (category, sheet) in crops {
        for (line, cost) in sheet.per_acre.iter().chain(sheet.per_cwt.iter()) {
            let field = format!("{category}.{line}");
            if *cost < Decimal::ZERO {
                return Err(ValidationError::NegativeMoney(field));
            }
            within_range(&field, *cost, MAX_UNIT_COST)?;
        }
    }
    for (line, cost) in defaults.fixed.lines() {
        let field = format!("fixed.{line}");
        if cost < Decimal::ZERO {
            return Err(ValidationError::NegativeMoney(field));
        }
        within_range(&field, cost, MAX_UNIT_COST)?;
    }
    Ok(())
}
