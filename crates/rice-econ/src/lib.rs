#![deny(warnings)]

//! Single-season financial model for a rice farm.
//!
//! The pipeline runs in dependency order:
//! - revenue from the main crop, the optional ratoon crop and program payments
//! - one-time establishment costs
//! - annual operating costs (variable per crop plus fixed)
//! - gross and net profit before tax
//! - two simplified single-period ROI ratios
//!
//! Every stage is a pure function of the resolved scenario, the cost table
//! supplied by the caller, and earlier stage results.

use rice_core::{
    ConfigurationError, CostDefaults, CostLine, CropCostSheet, CropVariableCosts,
    EstablishmentCostsResult, FinancialParameters, InputsSummary, LandTenure,
    OperationalExpendituresResult, ProfitabilityResult, ResolvedScenario, RevenueResult,
    RoiResult, ScenarioInput, ScenarioResult,
};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// The scenario model bound to an explicit cost table.
#[derive(Clone, Debug, Default)]
pub struct ScenarioModel {
    defaults: CostDefaults,
}

impl ScenarioModel {
    /// Bind the model to `defaults`.
    pub fn new(defaults: CostDefaults) -> Self {
        Self { defaults }
    }

    /// The cost table every run uses.
    pub fn defaults(&self) -> &CostDefaults {
        &self.defaults
    }

    /// Run every stage for `input`. Fails only when an active scenario
    /// selector does not resolve.
    pub fn run(&self, input: &ScenarioInput) -> Result<ScenarioResult, ConfigurationError> {
        run_full_model(input, &self.defaults)
    }
}

/// Revenue from both crops at the active price, plus program payments.
///
/// The ratoon crop sells at the main crop price.
pub fn compute_revenue(scenario: &ResolvedScenario<'_>) -> RevenueResult {
    let input = scenario.input;
    let acres = input.acres();
    let price = scenario.active_price;
    let ratoon_yield = input.effective_ratoon_yield();

    let main_crop_revenue = scenario.active_yield * price * acres;
    let ratoon_crop_revenue = if input.ratoon_cultivation {
        ratoon_yield * price * acres
    } else {
        Decimal::ZERO
    };
    let total = main_crop_revenue + ratoon_crop_revenue + input.government_program_payments;

    debug!(
        %main_crop_revenue,
        %ratoon_crop_revenue,
        total_gross_annual_revenue = %total,
        "revenue computed"
    );
    RevenueResult {
        main_crop_yield_cwt_per_acre: scenario.active_yield,
        ratoon_crop_yield_cwt_per_acre: ratoon_yield,
        unit_price: price,
        main_crop_revenue,
        ratoon_crop_revenue,
        government_program_payments: input.government_program_payments,
        total_gross_annual_revenue: total,
    }
}

/// Itemized one-time costs.
///
/// Land purchase appears only for owned land with a positive cost. First-year
/// rent on rented land is not an establishment cost and is left out entirely.
pub fn compute_establishment_costs(input: &ScenarioInput) -> EstablishmentCostsResult {
    let e = &input.establishment;
    let mut items = Vec::with_capacity(7);
    if input.land_tenure == LandTenure::Owned && e.land_purchase_cost > Decimal::ZERO {
        items.push(CostLine::new("land_purchase_cost", e.land_purchase_cost));
    }
    items.extend([
        CostLine::new("land_clearing", e.land_clearing_cost),
        CostLine::new("laser_land_leveling", e.laser_land_leveling_cost_total),
        CostLine::new(
            "levee_surveying_construction",
            e.levee_surveying_construction_cost_total,
        ),
        CostLine::new("well_drilling_pump_system", e.well_drilling_pump_system_cost),
        CostLine::new(
            "on_farm_irrigation_system_installation",
            e.on_farm_irrigation_system_installation_cost_total,
        ),
        CostLine::new("major_equipment_purchase_cost", e.major_equipment_purchase_cost),
    ]);
    let total: Decimal = items.iter().map(|l| l.amount).sum();

    debug!(items = items.len(), total_establishment_costs = %total, "establishment costs computed");
    EstablishmentCostsResult {
        items,
        total_establishment_costs: total,
    }
}

/// `(sum(per_acre) + yield * sum(per_cwt)) * acres`, with each line itemized.
fn crop_variable_costs(sheet: &CropCostSheet, yield_cwt: Decimal, acres: Decimal) -> CropVariableCosts {
    let per_acre_constant = sheet.per_acre_sum();
    let per_acre_yield_dependent = yield_cwt * sheet.per_cwt_sum();
    let per_acre_total = per_acre_constant + per_acre_yield_dependent;

    let constant_lines = sheet
        .per_acre
        .iter()
        .map(|(name, cost)| CostLine::new(name.as_str(), *cost * acres));
    let yield_lines = sheet
        .per_cwt
        .iter()
        .map(|(name, cost)| CostLine::new(name.as_str(), *cost * yield_cwt * acres));

    CropVariableCosts {
        per_acre_constant,
        per_acre_yield_dependent,
        per_acre_total,
        total: per_acre_total * acres,
        items: constant_lines.chain(yield_lines).collect(),
    }
}

/// Annual variable and fixed costs.
///
/// Yields come from the revenue stage, so both stages always agree on what
/// was harvested.
pub fn compute_operational_expenditures(
    input: &ScenarioInput,
    revenue: &RevenueResult,
    defaults: &CostDefaults,
) -> OperationalExpendituresResult {
    let acres = input.acres();

    let main_crop = crop_variable_costs(
        &defaults.main_crop,
        revenue.main_crop_yield_cwt_per_acre,
        acres,
    );
    let ratoon_crop = input.ratoon_cultivation.then(|| {
        crop_variable_costs(
            &defaults.ratoon_crop,
            revenue.ratoon_crop_yield_cwt_per_acre,
            acres,
        )
    });
    let total_main = main_crop.total;
    let total_ratoon = ratoon_crop.as_ref().map_or(Decimal::ZERO, |c| c.total);

    let fc = &defaults.fixed;
    let mut fixed_costs = Vec::with_capacity(7);
    match input.land_tenure {
        // already a farm total
        LandTenure::Owned => fixed_costs.push(CostLine::new(
            "property_taxes",
            input.fixed_costs.property_taxes_owned_total,
        )),
        LandTenure::Rented => fixed_costs.push(CostLine::new(
            "annual_land_rent",
            input.fixed_costs.annual_land_rent_per_acre * acres,
        )),
    }
    for (name, per_acre) in [
        ("crop_insurance", fc.crop_insurance),
        ("g_a_overhead", fc.g_a_overhead),
        ("pickup_mileage_charge", fc.pickup_mileage_charge),
        ("machinery_depreciation", fc.machinery_depreciation),
        ("equipment_investment_interest", fc.equipment_investment_interest),
    ] {
        fixed_costs.push(CostLine::new(name, per_acre * acres));
    }
    let mut management_fee = fc.management_fee_main_crop;
    if input.ratoon_cultivation {
        management_fee += fc.management_fee_ratoon_crop;
    }
    fixed_costs.push(CostLine::new(
        "management_fee_owner_labor",
        management_fee * acres,
    ));
    let total_fixed: Decimal = fixed_costs.iter().map(|l| l.amount).sum();
    let grand_total = total_main + total_ratoon + total_fixed;

    debug!(
        total_main_crop_variable_costs = %total_main,
        total_ratoon_crop_variable_costs = %total_ratoon,
        total_annual_fixed_costs = %total_fixed,
        total_annual_operational_costs = %grand_total,
        "operational expenditures computed"
    );
    OperationalExpendituresResult {
        main_crop,
        ratoon_crop,
        total_main_crop_variable_costs: total_main,
        total_ratoon_crop_variable_costs: total_ratoon,
        fixed_costs,
        total_annual_fixed_costs: total_fixed,
        total_annual_operational_costs: grand_total,
    }
}

/// Gross profit excludes fixed costs; net profit before tax includes them.
/// No tax is applied.
pub fn compute_profitability(
    revenue: &RevenueResult,
    operational: &OperationalExpendituresResult,
) -> ProfitabilityResult {
    let total_revenue = revenue.total_gross_annual_revenue;
    let gross_profit = total_revenue - operational.total_variable_costs();
    let net_profit_before_tax = total_revenue - operational.total_annual_operational_costs;
    debug!(%gross_profit, %net_profit_before_tax, "profitability computed");
    ProfitabilityResult {
        gross_profit,
        net_profit_before_tax,
    }
}

/// `numerator / denominator * 100`, defined as zero for a non-positive
/// denominator.
fn percent_of(numerator: Decimal, denominator: Decimal) -> Decimal {
    if denominator > Decimal::ZERO {
        numerator / denominator * Decimal::ONE_HUNDRED
    } else {
        Decimal::ZERO
    }
}

/// Net profit before tax as a percentage of operating costs and of
/// establishment costs. Both are single-season ratios without discounting.
pub fn compute_roi(
    profitability: &ProfitabilityResult,
    operational: &OperationalExpendituresResult,
    establishment: &EstablishmentCostsResult,
) -> RoiResult {
    let npbt = profitability.net_profit_before_tax;
    let roi = RoiResult {
        annual_operational_roi_pct: percent_of(npbt, operational.total_annual_operational_costs),
        roi_on_establishment_pct: percent_of(npbt, establishment.total_establishment_costs),
    };
    debug!(
        annual_operational_roi_pct = %roi.annual_operational_roi_pct,
        roi_on_establishment_pct = %roi.roi_on_establishment_pct,
        "roi computed"
    );
    roi
}

/// Resolve the active scenarios and run every stage.
///
/// Nothing is computed unless both selectors resolve.
pub fn run_full_model(
    input: &ScenarioInput,
    defaults: &CostDefaults,
) -> Result<ScenarioResult, ConfigurationError> {
    let scenario = input.resolve()?;

    let revenue = compute_revenue(&scenario);
    let establishment_costs = compute_establishment_costs(input);
    let operational_expenditures = compute_operational_expenditures(input, &revenue, defaults);
    let profitability = compute_profitability(&revenue, &operational_expenditures);
    let roi = compute_roi(&profitability, &operational_expenditures, &establishment_costs);

    info!(
        acres = input.farm_size_acres,
        tenure = %input.land_tenure,
        ratoon = input.ratoon_cultivation,
        yield_scenario = %input.yield_scenarios.active,
        price_scenario = %input.price_scenarios.active,
        net_profit_before_tax = %profitability.net_profit_before_tax,
        "scenario model run"
    );

    Ok(ScenarioResult {
        inputs_summary: InputsSummary {
            farm_size_acres: input.farm_size_acres,
            land_tenure: input.land_tenure,
            ratoon_cultivation: input.ratoon_cultivation,
            active_yield_scenario: input.yield_scenarios.active.clone(),
            active_yield_cwt_per_acre: scenario.active_yield,
            ratoon_yield_cwt_per_acre: input
                .ratoon_cultivation
                .then_some(input.ratoon_yield_cwt_per_acre),
            active_price_scenario: input.price_scenarios.active.clone(),
            active_price_per_cwt: scenario.active_price,
        },
        revenue,
        establishment_costs,
        operational_expenditures,
        profitability,
        roi,
        financial_parameters: FinancialParameters {
            discount_rate_pct: input.discount_rate_pct,
            project_horizon_years: input.project_horizon_years,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rice_core::{
        validate_cost_defaults, validate_input, EstablishmentInputs, FixedCostSheet,
        ScenarioKind, ScenarioTable, TenureFixedCosts, MAX_FARM_SIZE_ACRES, MAX_FARM_TOTAL,
        MAX_PRICE_PER_CWT, MAX_UNIT_COST, MAX_YIELD_CWT_PER_ACRE,
    };
    use rust_decimal_macros::dec;

    /// 50 owned acres, no ratoon crop, 75 cwt/acre at $16.00, no
    /// establishment costs.
    fn owned_50() -> ScenarioInput {
        ScenarioInput {
            farm_size_acres: 50,
            land_tenure: LandTenure::Owned,
            ratoon_cultivation: false,
            yield_scenarios: ScenarioTable::new(
                [("Low", dec!(65.0)), ("Average", dec!(75.0)), ("High", dec!(85.0))],
                "Average",
            ),
            ratoon_yield_cwt_per_acre: Decimal::ZERO,
            price_scenarios: ScenarioTable::new(
                [("Baseline", dec!(16.00)), ("Alternative", dec!(14.20))],
                "Baseline",
            ),
            discount_rate_pct: dec!(7.0),
            project_horizon_years: 10,
            government_program_payments: Decimal::ZERO,
            establishment: EstablishmentInputs::default(),
            fixed_costs: TenureFixedCosts {
                property_taxes_owned_total: dec!(500),
                annual_land_rent_per_acre: Decimal::ZERO,
            },
        }
    }

    fn with_ratoon(mut input: ScenarioInput, ratoon_yield: Decimal) -> ScenarioInput {
        input.ratoon_cultivation = true;
        input.ratoon_yield_cwt_per_acre = ratoon_yield;
        input
    }

    fn rented(mut input: ScenarioInput, rent_per_acre: Decimal) -> ScenarioInput {
        input.land_tenure = LandTenure::Rented;
        input.fixed_costs = TenureFixedCosts {
            property_taxes_owned_total: Decimal::ZERO,
            annual_land_rent_per_acre: rent_per_acre,
        };
        input
    }

    fn zero_cost_table() -> CostDefaults {
        CostDefaults {
            main_crop: CropCostSheet::default(),
            ratoon_crop: CropCostSheet::default(),
            fixed: FixedCostSheet::default(),
        }
    }

    fn run(input: &ScenarioInput) -> ScenarioResult {
        run_full_model(input, &CostDefaults::agrilife()).unwrap()
    }

    #[test]
    fn main_crop_only_revenue() {
        let r = run(&owned_50());
        assert_eq!(r.revenue.main_crop_revenue, dec!(60000.00));
        assert_eq!(r.revenue.ratoon_crop_revenue, Decimal::ZERO);
        assert_eq!(r.revenue.total_gross_annual_revenue, dec!(60000.00));
    }

    #[test]
    fn ratoon_crop_uses_main_crop_price() {
        let r = run(&with_ratoon(owned_50(), dec!(16.0)));
        assert_eq!(r.revenue.ratoon_crop_revenue, dec!(12800.00));
        assert_eq!(r.revenue.total_gross_annual_revenue, dec!(72800.00));
        assert_eq!(r.revenue.unit_price, dec!(16.00));
    }

    #[test]
    fn government_payments_add_to_revenue() {
        let mut input = owned_50();
        input.government_program_payments = dec!(1234.56);
        let r = run(&input);
        assert_eq!(r.revenue.government_program_payments, dec!(1234.56));
        assert_eq!(r.revenue.total_gross_annual_revenue, dec!(61234.56));
    }

    #[test]
    fn ratoon_yield_without_ratoon_crop_is_ignored() {
        let mut input = owned_50();
        input.ratoon_yield_cwt_per_acre = dec!(20);
        let r = run(&input);
        assert_eq!(r.revenue.ratoon_crop_revenue, Decimal::ZERO);
        assert_eq!(r.revenue.ratoon_crop_yield_cwt_per_acre, Decimal::ZERO);
        assert_eq!(r.inputs_summary.ratoon_yield_cwt_per_acre, None);
    }

    #[test]
    fn operational_costs_owned_no_ratoon() {
        let r = run(&owned_50());
        let op = &r.operational_expenditures;
        // (668.45 + 75 * 2.31) * 50
        assert_eq!(op.main_crop.per_acre_constant, dec!(668.45));
        assert_eq!(op.main_crop.per_acre_yield_dependent, dec!(173.25));
        assert_eq!(op.total_main_crop_variable_costs, dec!(42085.00));
        assert!(op.ratoon_crop.is_none());
        assert_eq!(op.total_ratoon_crop_variable_costs, Decimal::ZERO);

        assert_eq!(op.fixed_cost("property_taxes"), Some(dec!(500)));
        assert_eq!(op.fixed_cost("annual_land_rent"), None);
        assert_eq!(op.fixed_cost("crop_insurance"), Some(dec!(550.00)));
        assert_eq!(op.fixed_cost("management_fee_owner_labor"), Some(dec!(2800.00)));
        // 500 + 114.48 * 50 + 56 * 50
        assert_eq!(op.total_annual_fixed_costs, dec!(9024.00));
        assert_eq!(op.total_annual_operational_costs, dec!(51109.00));

        assert_eq!(r.profitability.gross_profit, dec!(17915.00));
        assert_eq!(r.profitability.net_profit_before_tax, dec!(8891.00));
        assert_eq!(
            r.roi.annual_operational_roi_pct,
            dec!(8891) / dec!(51109) * dec!(100)
        );
    }

    #[test]
    fn itemized_lines_sum_to_crop_total() {
        let r = run(&with_ratoon(owned_50(), dec!(16.0)));
        let op = &r.operational_expenditures;
        for crop in [Some(&op.main_crop), op.ratoon_crop.as_ref()].into_iter().flatten() {
            let sum: Decimal = crop.items.iter().map(|l| l.amount).sum();
            assert_eq!(sum, crop.total);
        }
        let ratoon = op.ratoon_crop.as_ref().unwrap();
        // (119.32 + 16 * 2.31) * 50
        assert_eq!(ratoon.total, dec!(7814.00));
        assert_eq!(op.fixed_cost("management_fee_owner_labor"), Some(dec!(3300.00)));
        assert_eq!(op.total_annual_fixed_costs, dec!(9524.00));
        assert_eq!(
            op.total_annual_operational_costs,
            dec!(42085.00) + dec!(7814.00) + dec!(9524.00)
        );
    }

    #[test]
    fn rented_land_pays_rent_instead_of_tax() {
        let r = run(&rented(owned_50(), dec!(75.0)));
        let op = &r.operational_expenditures;
        assert_eq!(op.fixed_cost("annual_land_rent"), Some(dec!(3750.0)));
        assert_eq!(op.fixed_cost("property_taxes"), None);
        assert_eq!(op.fixed_costs.len(), 7);
    }

    #[test]
    fn land_purchase_only_for_owned_land() {
        let mut input = owned_50();
        input.establishment.land_purchase_cost = dec!(200000);
        let r = run(&input);
        assert_eq!(r.establishment_costs.item("land_purchase_cost"), Some(dec!(200000)));
        assert_eq!(r.establishment_costs.items.len(), 7);
        assert_eq!(r.establishment_costs.total_establishment_costs, dec!(200000));

        input.establishment.land_purchase_cost = Decimal::ZERO;
        let r = run(&input);
        assert_eq!(r.establishment_costs.item("land_purchase_cost"), None);
        assert_eq!(r.establishment_costs.items.len(), 6);
    }

    #[test]
    fn first_year_rent_is_in_no_total() {
        let mut input = rented(owned_50(), dec!(75.0));
        let baseline = run(&input);
        input.establishment.first_year_land_rental_cost = dec!(9999);
        let r = run(&input);
        assert_eq!(r.establishment_costs, baseline.establishment_costs);
        assert_eq!(r.operational_expenditures, baseline.operational_expenditures);
        assert_eq!(r.establishment_costs.items.len(), 6);
    }

    #[test]
    fn laser_leveling_only_establishment() {
        let mut input = owned_50();
        input.establishment.laser_land_leveling_cost_total = dec!(150) * dec!(50);
        let r = run(&input);
        assert_eq!(r.establishment_costs.total_establishment_costs, dec!(7500.00));
        assert_eq!(r.establishment_costs.item("land_clearing"), Some(Decimal::ZERO));
        assert_eq!(
            r.roi.roi_on_establishment_pct,
            r.profitability.net_profit_before_tax / dec!(7500) * dec!(100)
        );
    }

    #[test]
    fn roi_is_zero_without_costs() {
        let mut input = owned_50();
        input.fixed_costs.property_taxes_owned_total = Decimal::ZERO;
        let r = run_full_model(&input, &zero_cost_table()).unwrap();
        assert_eq!(r.operational_expenditures.total_annual_operational_costs, Decimal::ZERO);
        assert_eq!(r.establishment_costs.total_establishment_costs, Decimal::ZERO);
        assert_eq!(r.profitability.net_profit_before_tax, dec!(60000));
        assert_eq!(r.roi.annual_operational_roi_pct, Decimal::ZERO);
        assert_eq!(r.roi.roi_on_establishment_pct, Decimal::ZERO);
    }

    #[test]
    fn losses_are_reported_not_rejected() {
        let mut input = owned_50();
        input.price_scenarios.active = "Alternative".into();
        input.yield_scenarios.active = "Low".into();
        input.establishment.major_equipment_purchase_cost = dec!(100000);
        let r = run(&input);
        // 65 * 14.20 * 50 = 46150 against (668.45 + 65 * 2.31) * 50 + 9024
        assert_eq!(r.revenue.main_crop_revenue, dec!(46150));
        assert_eq!(r.operational_expenditures.total_annual_operational_costs, dec!(49954.00));
        assert_eq!(r.profitability.net_profit_before_tax, dec!(-3804.00));
        assert!(r.roi.annual_operational_roi_pct < Decimal::ZERO);
        assert!(r.roi.roi_on_establishment_pct < Decimal::ZERO);
    }

    #[test]
    fn unknown_selector_produces_no_result() {
        let mut input = owned_50();
        input.price_scenarios.active = "Spot".into();
        let err = run_full_model(&input, &CostDefaults::agrilife()).unwrap_err();
        assert_eq!(
            err,
            ConfigurationError::UnknownScenario {
                kind: ScenarioKind::Price,
                name: "Spot".into(),
            }
        );
    }

    #[test]
    fn passes_financial_parameters_through() {
        let r = run(&owned_50());
        assert_eq!(r.financial_parameters.discount_rate_pct, dec!(7.0));
        assert_eq!(r.financial_parameters.project_horizon_years, 10);
        assert_eq!(r.inputs_summary.active_yield_scenario, "Average");
        assert_eq!(r.inputs_summary.active_price_per_cwt, dec!(16.00));
    }

    #[test]
    fn model_uses_supplied_cost_table() {
        let mut table = CostDefaults::agrilife();
        table.fixed.crop_insurance = dec!(20.00);
        let model = ScenarioModel::new(table);
        let r = model.run(&owned_50()).unwrap();
        assert_eq!(
            r.operational_expenditures.fixed_cost("crop_insurance"),
            Some(dec!(1000.00))
        );
        assert_eq!(model.defaults().fixed.crop_insurance, dec!(20.00));
    }

    #[test]
    fn largest_validated_scenario_runs() {
        let mut table = CostDefaults::agrilife();
        for sheet in [&mut table.main_crop, &mut table.ratoon_crop] {
            sheet.per_acre.values_mut().for_each(|c| *c = MAX_UNIT_COST);
            sheet.per_cwt.values_mut().for_each(|c| *c = MAX_UNIT_COST);
        }
        table.fixed = FixedCostSheet {
            crop_insurance: MAX_UNIT_COST,
            g_a_overhead: MAX_UNIT_COST,
            pickup_mileage_charge: MAX_UNIT_COST,
            machinery_depreciation: MAX_UNIT_COST,
            equipment_investment_interest: MAX_UNIT_COST,
            management_fee_main_crop: MAX_UNIT_COST,
            management_fee_ratoon_crop: MAX_UNIT_COST,
        };
        validate_cost_defaults(&table).unwrap();

        let mut input = with_ratoon(owned_50(), MAX_YIELD_CWT_PER_ACRE);
        input.farm_size_acres = MAX_FARM_SIZE_ACRES;
        input.yield_scenarios = ScenarioTable::new([("Max", MAX_YIELD_CWT_PER_ACRE)], "Max");
        input.price_scenarios = ScenarioTable::new([("Max", MAX_PRICE_PER_CWT)], "Max");
        input.government_program_payments = MAX_FARM_TOTAL;
        input.fixed_costs.property_taxes_owned_total = MAX_FARM_TOTAL;
        input.establishment = EstablishmentInputs {
            land_purchase_cost: MAX_FARM_TOTAL,
            land_clearing_cost: MAX_FARM_TOTAL,
            laser_land_leveling_cost_total: MAX_FARM_TOTAL,
            levee_surveying_construction_cost_total: MAX_FARM_TOTAL,
            well_drilling_pump_system_cost: MAX_FARM_TOTAL,
            on_farm_irrigation_system_installation_cost_total: MAX_FARM_TOTAL,
            major_equipment_purchase_cost: MAX_FARM_TOTAL,
            ..Default::default()
        };
        validate_input(&input).unwrap();

        let r = run_full_model(&input, &table).unwrap();
        assert_eq!(r.revenue.main_crop_revenue, dec!(1000000000000000));
        assert!(r.profitability.net_profit_before_tax < Decimal::ZERO);
    }

    #[test]
    fn smallest_validated_costs_keep_roi_finite() {
        let mut table = zero_cost_table();
        table
            .main_crop
            .per_cwt
            .insert("hauling_per_cwt".into(), dec!(0.0001));
        validate_cost_defaults(&table).unwrap();

        let mut input = owned_50();
        input.farm_size_acres = 1;
        input.yield_scenarios = ScenarioTable::new([("Thin", dec!(0.0001))], "Thin");
        input.price_scenarios = ScenarioTable::new([("Max", MAX_PRICE_PER_CWT)], "Max");
        input.government_program_payments = MAX_FARM_TOTAL;
        input.fixed_costs.property_taxes_owned_total = Decimal::ZERO;
        input.establishment.land_clearing_cost = dec!(0.0001);
        validate_input(&input).unwrap();

        let r = run_full_model(&input, &table).unwrap();
        assert_eq!(
            r.operational_expenditures.total_annual_operational_costs,
            dec!(0.00000001)
        );
        assert!(r.roi.annual_operational_roi_pct > Decimal::ZERO);
        assert!(r.roi.roi_on_establishment_pct > Decimal::ZERO);
    }

    fn arb_input() -> impl Strategy<Value = ScenarioInput> {
        (
            1u32..5_000,
            any::<bool>(),
            any::<bool>(),
            0i64..2_000,
            0i64..500,
            1i64..5_000,
            0i64..10_000_000,
            0i64..50_000_000,
        )
            .prop_map(
                |(acres, owned, ratoon, yield_tenths, ratoon_tenths, price_cents, gov_cents, est_cents)| {
                    let mut input = owned_50();
                    input.farm_size_acres = acres;
                    if !owned {
                        input = rented(input, dec!(75));
                    }
                    input.ratoon_cultivation = ratoon;
                    input.ratoon_yield_cwt_per_acre = Decimal::new(ratoon_tenths, 1);
                    input.yield_scenarios = ScenarioTable::new([("Y", Decimal::new(yield_tenths, 1))], "Y");
                    input.price_scenarios = ScenarioTable::new([("P", Decimal::new(price_cents, 2))], "P");
                    input.government_program_payments = Decimal::new(gov_cents, 2);
                    input.establishment.land_clearing_cost = Decimal::new(est_cents, 2);
                    input
                },
            )
    }

    proptest! {
        #[test]
        fn total_revenue_identity(input in arb_input()) {
            let r = run(&input);
            prop_assert_eq!(
                r.revenue.total_gross_annual_revenue,
                r.revenue.main_crop_revenue + r.revenue.ratoon_crop_revenue
                    + r.revenue.government_program_payments
            );
            prop_assert_eq!(
                r.operational_expenditures.total_annual_operational_costs,
                r.operational_expenditures.total_variable_costs()
                    + r.operational_expenditures.total_annual_fixed_costs
            );
        }

        #[test]
        fn no_ratoon_means_no_ratoon_figures(mut input in arb_input()) {
            input.ratoon_cultivation = false;
            let r = run(&input);
            let fee = CostDefaults::agrilife().fixed.management_fee_main_crop * input.acres();
            prop_assert_eq!(r.revenue.ratoon_crop_revenue, Decimal::ZERO);
            prop_assert_eq!(r.operational_expenditures.total_ratoon_crop_variable_costs, Decimal::ZERO);
            prop_assert!(r.operational_expenditures.ratoon_crop.is_none());
            prop_assert_eq!(r.operational_expenditures.fixed_cost("management_fee_owner_labor"), Some(fee));
        }

        #[test]
        fn runs_are_idempotent(input in arb_input()) {
            let defaults = CostDefaults::agrilife();
            let a = run_full_model(&input, &defaults).unwrap();
            let b = run_full_model(&input, &defaults).unwrap();
            prop_assert_eq!(a, b);
        }

        #[test]
        fn higher_yield_raises_revenue_and_yield_costs(input in arb_input(), bump in 1i64..500) {
            let mut higher = input.clone();
            let y = input.yield_scenarios.options["Y"];
            higher.yield_scenarios.options.insert("Y".into(), y + Decimal::new(bump, 1));
            let lo = run(&input);
            let hi = run(&higher);
            prop_assert!(hi.revenue.main_crop_revenue > lo.revenue.main_crop_revenue);
            prop_assert!(
                hi.operational_expenditures.main_crop.per_acre_yield_dependent
                    > lo.operational_expenditures.main_crop.per_acre_yield_dependent
            );
            prop_assert!(
                hi.operational_expenditures.total_main_crop_variable_costs
                    > lo.operational_expenditures.total_main_crop_variable_costs
            );
        }

        #[test]
        fn tenure_selects_exactly_one_land_cost(input in arb_input(), purchase in 1i64..1_000_000) {
            let mut input = input;
            if input.land_tenure == LandTenure::Owned {
                input.establishment.land_purchase_cost = Decimal::new(purchase, 0);
            }
            let r = run(&input);
            let op = &r.operational_expenditures;
            let has_tax = op.fixed_cost("property_taxes").is_some();
            let has_rent = op.fixed_cost("annual_land_rent").is_some();
            prop_assert!(has_tax != has_rent);
            let owned = input.land_tenure == LandTenure::Owned;
            prop_assert_eq!(has_tax, owned);
            prop_assert_eq!(r.establishment_costs.item("land_purchase_cost").is_some(), owned);
        }
    }
}
