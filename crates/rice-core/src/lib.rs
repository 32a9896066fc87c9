#![deny(warnings)]

//! Core domain models and invariants for the rice farm scenario modeler.
//!
//! This crate defines the serializable scenario input, the result records the
//! model produces, the unit cost table, and validation helpers that guarantee
//! basic invariants before a scenario is run.

mod defaults;

pub use defaults::{
    validate_cost_defaults, CostCategory, CostDefaults, CostOverrides, CropCostSheet,
    FixedCostSheet,
};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// How the farmed land is held.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LandTenure {
    Owned,
    Rented,
}

impl fmt::Display for LandTenure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LandTenure::Owned => "Owned",
            LandTenure::Rented => "Rented",
        })
    }
}

/// Which scenario table a selector points into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScenarioKind {
    /// Main crop yield in cwt/acre.
    Yield,
    /// Rice price in USD/cwt.
    Price,
}

impl fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScenarioKind::Yield => "yield",
            ScenarioKind::Price => "price",
        })
    }
}

/// Named scenario values plus the name of the active one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioTable {
    pub options: BTreeMap<String, Decimal>,
    pub active: String,
}

impl ScenarioTable {
    /// Table of named `options` with `active` selected; the name is checked on resolve.
    pub fn new<K: Into<String>>(
        options: impl IntoIterator<Item = (K, Decimal)>,
        active: impl Into<String>,
    ) -> Self {
        Self {
            options: options.into_iter().map(|(k, v)| (k.into(), v)).collect(),
            active: active.into(),
        }
    }

    /// Look up the active value. A missing name is a configuration error,
    /// never a silent default.
    pub fn resolve(&self, kind: ScenarioKind) -> Result<Decimal, ConfigurationError> {
        self.options.get(&self.active).copied().ok_or_else(|| {
            warn!(%kind, name = %self.active, "active scenario not found");
            ConfigurationError::UnknownScenario {
                kind,
                name: self.active.clone(),
            }
        })
    }
}

/// One-time or infrequent costs, all farm totals in USD.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstablishmentInputs {
    /// Only meaningful for owned land.
    pub land_purchase_cost: Decimal,
    /// Only meaningful for rented land. Collected but not part of any total.
    pub first_year_land_rental_cost: Decimal,
    pub land_clearing_cost: Decimal,
    pub laser_land_leveling_cost_total: Decimal,
    pub levee_surveying_construction_cost_total: Decimal,
    pub well_drilling_pump_system_cost: Decimal,
    pub on_farm_irrigation_system_installation_cost_total: Decimal,
    pub major_equipment_purchase_cost: Decimal,
}

impl EstablishmentInputs {
    fn fields(&self) -> [(&'static str, Decimal); 8] {
        [
            ("land_purchase_cost", self.land_purchase_cost),
            ("first_year_land_rental_cost", self.first_year_land_rental_cost),
            ("land_clearing_cost", self.land_clearing_cost),
            ("laser_land_leveling_cost_total", self.laser_land_leveling_cost_total),
            (
                "levee_surveying_construction_cost_total",
                self.levee_surveying_construction_cost_total,
            ),
            ("well_drilling_pump_system_cost", self.well_drilling_pump_system_cost),
            (
                "on_farm_irrigation_system_installation_cost_total",
                self.on_farm_irrigation_system_installation_cost_total,
            ),
            ("major_equipment_purchase_cost", self.major_equipment_purchase_cost),
        ]
    }
}

/// Fixed costs whose meaning depends on land tenure.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TenureFixedCosts {
    /// Farm total in USD, owned land only.
    pub property_taxes_owned_total: Decimal,
    /// USD per acre, rented land only.
    pub annual_land_rent_per_acre: Decimal,
}

/// Flat, fully populated input for a single model run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioInput {
    /// Farm size in acres (>= 1).
    pub farm_size_acres: u32,
    pub land_tenure: LandTenure,
    pub ratoon_cultivation: bool,
    /// Main crop yield scenarios in cwt/acre.
    pub yield_scenarios: ScenarioTable,
    /// Ratoon crop yield in cwt/acre; ignored unless `ratoon_cultivation`.
    #[serde(default)]
    pub ratoon_yield_cwt_per_acre: Decimal,
    /// Rice price scenarios in USD/cwt. The ratoon crop sells at the same price.
    pub price_scenarios: ScenarioTable,
    /// Discount rate in percent. Carried through, not used by the model.
    #[serde(default)]
    pub discount_rate_pct: Decimal,
    /// Project horizon in years. Carried through, not used by the model.
    #[serde(default)]
    pub project_horizon_years: u32,
    /// Government program payments, farm total in USD.
    #[serde(default)]
    pub government_program_payments: Decimal,
    #[serde(default)]
    pub establishment: EstablishmentInputs,
    #[serde(default)]
    pub fixed_costs: TenureFixedCosts,
}

impl ScenarioInput {
    /// The default form values for a 50 acre owned farm with a ratoon crop.
    pub fn reference() -> Self {
        let acres = 50u32;
        let a = Decimal::from(acres);
        Self {
            farm_size_acres: acres,
            land_tenure: LandTenure::Owned,
            ratoon_cultivation: true,
            yield_scenarios: ScenarioTable::new(
                [
                    ("Low", dec!(65.0)),
                    ("Average", dec!(75.0)),
                    ("High", dec!(85.0)),
                ],
                "Average",
            ),
            ratoon_yield_cwt_per_acre: dec!(16.0),
            price_scenarios: ScenarioTable::new(
                [
                    ("Baseline ($16.00)", dec!(16.00)),
                    ("Alternative 1 ($14.20)", dec!(14.20)),
                    ("Alternative 2 (User-defined)", dec!(15.00)),
                ],
                "Baseline ($16.00)",
            ),
            discount_rate_pct: dec!(7.0),
            project_horizon_years: 10,
            government_program_payments: Decimal::ZERO,
            establishment: EstablishmentInputs {
                laser_land_leveling_cost_total: dec!(150) * a,
                // survey ~$7/acre plus construction ~$200/acre
                levee_surveying_construction_cost_total: dec!(7) * a + dec!(200) * a,
                on_farm_irrigation_system_installation_cost_total: dec!(210) * a,
                ..Default::default()
            },
            fixed_costs: TenureFixedCosts {
                property_taxes_owned_total: dec!(500.0),
                annual_land_rent_per_acre: Decimal::ZERO,
            },
        }
    }

    /// Resolve the active yield and price selectors.
    pub fn resolve(&self) -> Result<ResolvedScenario<'_>, ConfigurationError> {
        let active_yield = self.yield_scenarios.resolve(ScenarioKind::Yield)?;
        let active_price = self.price_scenarios.resolve(ScenarioKind::Price)?;
        Ok(ResolvedScenario {
            input: self,
            active_yield,
            active_price,
        })
    }

    /// Farm size as a decimal multiplier.
    pub fn acres(&self) -> Decimal {
        Decimal::from(self.farm_size_acres)
    }

    /// Ratoon yield that actually applies: zero when no ratoon crop is grown.
    pub fn effective_ratoon_yield(&self) -> Decimal {
        if self.ratoon_cultivation {
            self.ratoon_yield_cwt_per_acre
        } else {
            Decimal::ZERO
        }
    }
}

/// A scenario input with its active yield and price looked up.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedScenario<'a> {
    pub input: &'a ScenarioInput,
    /// Main crop yield in cwt/acre.
    pub active_yield: Decimal,
    /// Price in USD/cwt.
    pub active_price: Decimal,
}

/// A named amount in a cost breakdown.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CostLine {
    pub name: String,
    pub amount: Decimal,
}

impl CostLine {
    /// Build a line from its name and farm-total amount.
    pub fn new(name: impl Into<String>, amount: Decimal) -> Self {
        Self {
            name: name.into(),
            amount,
        }
    }
}

fn find_line(lines: &[CostLine], name: &str) -> Option<Decimal> {
    lines.iter().find(|l| l.name == name).map(|l| l.amount)
}

/// Revenue breakdown, farm totals in USD.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevenueResult {
    /// Main crop yield used, cwt/acre.
    pub main_crop_yield_cwt_per_acre: Decimal,
    /// Ratoon yield used, cwt/acre (zero without a ratoon crop).
    pub ratoon_crop_yield_cwt_per_acre: Decimal,
    /// Price applied to both crops, USD/cwt.
    pub unit_price: Decimal,
    pub main_crop_revenue: Decimal,
    pub ratoon_crop_revenue: Decimal,
    pub government_program_payments: Decimal,
    pub total_gross_annual_revenue: Decimal,
}

/// Itemized one-time costs, farm totals in USD.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EstablishmentCostsResult {
    pub items: Vec<CostLine>,
    pub total_establishment_costs: Decimal,
}

impl EstablishmentCostsResult {
    /// Amount of the named item, if it was itemized.
    pub fn item(&self, name: &str) -> Option<Decimal> {
        find_line(&self.items, name)
    }
}

/// Variable costs for one crop.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CropVariableCosts {
    /// Sum of constant lines, USD/acre.
    pub per_acre_constant: Decimal,
    /// Yield times the per-cwt lines, USD/acre.
    pub per_acre_yield_dependent: Decimal,
    pub per_acre_total: Decimal,
    /// Farm total in USD.
    pub total: Decimal,
    /// Farm-total amount of every line.
    pub items: Vec<CostLine>,
}

/// Annual operating costs, farm totals in USD.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationalExpendituresResult {
    pub main_crop: CropVariableCosts,
    /// Present only when a ratoon crop is grown.
    pub ratoon_crop: Option<CropVariableCosts>,
    pub total_main_crop_variable_costs: Decimal,
    pub total_ratoon_crop_variable_costs: Decimal,
    pub fixed_costs: Vec<CostLine>,
    pub total_annual_fixed_costs: Decimal,
    pub total_annual_operational_costs: Decimal,
}

impl OperationalExpendituresResult {
    /// Amount of the named fixed-cost line, if present for this tenure.
    pub fn fixed_cost(&self, name: &str) -> Option<Decimal> {
        find_line(&self.fixed_costs, name)
    }

    /// Main plus ratoon variable costs.
    pub fn total_variable_costs(&self) -> Decimal {
        self.total_main_crop_variable_costs + self.total_ratoon_crop_variable_costs
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilityResult {
    /// Revenue less variable costs.
    pub gross_profit: Decimal,
    /// Revenue less all operating costs. May be negative.
    pub net_profit_before_tax: Decimal,
}

/// Simplified single-period return ratios in percent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoiResult {
    pub annual_operational_roi_pct: Decimal,
    /// Not a multi-year return: one season of profit over establishment cost.
    pub roi_on_establishment_pct: Decimal,
}

/// Echo of the selections a result was computed from.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InputsSummary {
    pub farm_size_acres: u32,
    pub land_tenure: LandTenure,
    pub ratoon_cultivation: bool,
    pub active_yield_scenario: String,
    pub active_yield_cwt_per_acre: Decimal,
    /// `None` when no ratoon crop is grown.
    pub ratoon_yield_cwt_per_acre: Option<Decimal>,
    pub active_price_scenario: String,
    pub active_price_per_cwt: Decimal,
}

/// Collected for future discounted analysis; passed through untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinancialParameters {
    pub discount_rate_pct: Decimal,
    pub project_horizon_years: u32,
}

/// Full output of one model run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub inputs_summary: InputsSummary,
    pub revenue: RevenueResult,
    pub establishment_costs: EstablishmentCostsResult,
    pub operational_expenditures: OperationalExpendituresResult,
    pub profitability: ProfitabilityResult,
    pub roi: RoiResult,
    pub financial_parameters: FinancialParameters,
}

/// Errors in how a scenario or cost table is configured.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    /// Active selector names a scenario missing from its table.
    #[error("active {kind} scenario {name:?} not found")]
    UnknownScenario { kind: ScenarioKind, name: String },
    /// Override names a line that the category does not have.
    #[error("unknown cost line {category}.{line}")]
    UnknownCostLine { category: CostCategory, line: String },
}

/// Largest farm accepted by [`validate_input`].
pub const MAX_FARM_SIZE_ACRES: u32 = 1_000_000;
/// Largest yield, cwt/acre.
pub const MAX_YIELD_CWT_PER_ACRE: Decimal = dec!(10000);
/// Largest price, USD/cwt.
pub const MAX_PRICE_PER_CWT: Decimal = dec!(100000);
/// Largest per-acre or per-cwt unit cost, USD.
pub const MAX_UNIT_COST: Decimal = dec!(1000000);
/// Largest farm-total amount, USD.
pub const MAX_FARM_TOTAL: Decimal = dec!(1000000000000);
/// Most decimal places accepted on any input value.
///
/// With the limits above, every product stays below 1e18 and every non-zero
/// cost total stays at or above 1e-8, so the ROI quotients fit in a `Decimal`.
pub const MAX_DECIMAL_PLACES: u32 = 4;

/// Validation errors for scenario invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("farm size must be at least 1 acre")]
    ZeroFarmSize,
    /// Monetary field must be non-negative.
    #[error("negative monetary value for {0}")]
    NegativeMoney(String),
    /// Yield, price or rate must be non-negative.
    #[error("negative quantity for {0}")]
    NegativeQuantity(String),
    /// Value above its limit, or with more than [`MAX_DECIMAL_PLACES`].
    #[error("{field} is out of range (max {max}, at most 4 decimal places)")]
    OutOfRange { field: String, max: Decimal },
    #[error("{0} scenario table is empty")]
    EmptyScenarioTable(ScenarioKind),
    /// A cost belonging to the other tenure was supplied.
    #[error("{field} must be zero for {tenure} land")]
    InactiveTenureCost {
        tenure: LandTenure,
        field: &'static str,
    },
}

/// Reject values above `max` or finer than [`MAX_DECIMAL_PLACES`].
pub(crate) fn within_range(field: &str, value: Decimal, max: Decimal) -> Result<(), ValidationError> {
    if value > max || value.normalize().scale() > MAX_DECIMAL_PLACES {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            max,
        });
    }
    Ok(())
}

fn non_negative_money(field: &str, amount: Decimal, max: Decimal) -> Result<(), ValidationError> {
    if amount < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney(field.to_string()));
    }
    within_range(field, amount, max)
}

fn validate_table(
    table: &ScenarioTable,
    kind: ScenarioKind,
    max: Decimal,
) -> Result<(), ValidationError> {
    if table.options.is_empty() {
        return Err(ValidationError::EmptyScenarioTable(kind));
    }
    for (name, value) in &table.options {
        let field = format!("{kind} scenario {name}");
        if *value < Decimal::ZERO {
            return Err(ValidationError::NegativeQuantity(field));
        }
        within_range(&field, *value, max)?;
    }
    Ok(())
}

/// Validate a scenario input. Does not check the active selectors; those are
/// resolved, and fail, when the model runs.
///
/// A validated input run against a validated cost table cannot overflow.
pub fn validate_input(input: &ScenarioInput) -> Result<(), ValidationError> {
    if input.farm_size_acres == 0 {
        return Err(ValidationError::ZeroFarmSize);
    }
    if input.farm_size_acres > MAX_FARM_SIZE_ACRES {
        return Err(ValidationError::OutOfRange {
            field: "farm_size_acres".into(),
            max: Decimal::from(MAX_FARM_SIZE_ACRES),
        });
    }
    validate_table(&input.yield_scenarios, ScenarioKind::Yield, MAX_YIELD_CWT_PER_ACRE)?;
    validate_table(&input.price_scenarios, ScenarioKind::Price, MAX_PRICE_PER_CWT)?;
    if input.ratoon_yield_cwt_per_acre < Decimal::ZERO {
        return Err(ValidationError::NegativeQuantity(
            "ratoon_yield_cwt_per_acre".into(),
        ));
    }
    within_range(
        "ratoon_yield_cwt_per_acre",
        input.ratoon_yield_cwt_per_acre,
        MAX_YIELD_CWT_PER_ACRE,
    )?;
    if input.discount_rate_pct < Decimal::ZERO {
        return Err(ValidationError::NegativeQuantity("discount_rate_pct".into()));
    }
    non_negative_money(
        "government_program_payments",
        input.government_program_payments,
        MAX_FARM_TOTAL,
    )?;
    for (field, amount) in input.establishment.fields() {
        non_negative_money(field, amount, MAX_FARM_TOTAL)?;
    }
    let fixed = &input.fixed_costs;
    non_negative_money(
        "property_taxes_owned_total",
        fixed.property_taxes_owned_total,
        MAX_FARM_TOTAL,
    )?;
    non_negative_money(
        "annual_land_rent_per_acre",
        fixed.annual_land_rent_per_acre,
        MAX_UNIT_COST,
    )?;

    let inactive = match input.land_tenure {
        LandTenure::Owned => [
            (
                "first_year_land_rental_cost",
                input.establishment.first_year_land_rental_cost,
            ),
            ("annual_land_rent_per_acre", fixed.annual_land_rent_per_acre),
        ],
        LandTenure::Rented => [
            ("land_purchase_cost", input.establishment.land_purchase_cost),
            ("property_taxes_owned_total", fixed.property_taxes_owned_total),
        ],
    };
    for (field, amount) in inactive {
        if !amount.is_zero() {
            return Err(ValidationError::InactiveTenureCost {
                tenure: input.land_tenure,
                field,
            });
        }
    }
    Ok(())
}
