//! Cost, production, and discounted-cash-flow estimates for the winning
//! selection.

use std::fmt;

use serde::Serialize;

use crate::config::DesignRequirements;
use crate::engine::location::LocationFactors;
use crate::engine::types::EquipmentSelection;

/// Installation plus balance-of-system markup over equipment cost
/// (25% + 15%).
const INSTALL_MARKUP: f64 = 1.40;
/// DC-side system efficiency (wiring, mismatch, inverter conversion).
const SYSTEM_EFFICIENCY: f64 = 0.85;
/// Overall performance ratio of the installed plant.
const PERFORMANCE_RATIO: f64 = 0.82;
/// Economic horizon (years).
const LIFETIME_YEARS: usize = 25;
/// Fixed discount rate for NPV and LCOE.
const DISCOUNT_RATE: f64 = 0.04;
/// Retail electricity price (currency units / kWh).
const ELECTRICITY_PRICE_PER_KWH: f64 = 0.12;
/// Annual O&M cost as a fraction of total installed cost.
const OM_RATE: f64 = 0.005;
/// Grid emission factor (kg CO₂ / kWh).
const GRID_EMISSION_KG_PER_KWH: f64 = 0.5;
/// Annual CO₂ uptake of one mature tree (kg).
const KG_CO2_PER_TREE_PER_YR: f64 = 22.0;
/// IRR bisection bracket lower bound.
const IRR_RATE_MIN: f64 = -0.10;
/// IRR bisection bracket upper bound.
const IRR_RATE_MAX: f64 = 0.30;
/// IRR convergence tolerance on |NPV| (currency units).
const IRR_NPV_TOLERANCE: f64 = 100.0;
/// IRR bisection iteration cap.
const IRR_MAX_ITERATIONS: usize = 20;

fn serialize_non_finite_as_null<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    if value.is_finite() {
        serializer.serialize_f64(*value)
    } else {
        serializer.serialize_none()
    }
}

/// Financial and environmental estimates over the economic horizon.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialEstimates {
    /// Panel and inverter hardware cost.
    pub equipment_cost: f64,
    /// Hardware cost with installation and balance-of-system markup.
    pub total_cost: f64,
    /// First-year production (kWh).
    pub annual_production_kwh: f64,
    /// Degradation-adjusted production per year, 25 entries (kWh).
    pub yearly_production_kwh: Vec<f64>,
    /// Sum of the yearly productions (kWh).
    pub lifetime_production_kwh: f64,
    /// Net present value at the fixed discount rate.
    pub npv: f64,
    /// Internal rate of return; `None` when no root lies in the
    /// bracketed rate range.
    pub irr: Option<f64>,
    /// False when the IRR is the iteration-capped midpoint estimate,
    /// an approximation that is documented rather than masked.
    pub irr_converged: bool,
    /// Levelized cost of energy (currency units / kWh); infinite with
    /// zero production, serialized as null.
    #[serde(serialize_with = "serialize_non_finite_as_null")]
    pub lcoe: f64,
    /// Simple payback period (years); infinite whenever net annual cash
    /// flow is non-positive, serialized as null.
    #[serde(serialize_with = "serialize_non_finite_as_null")]
    pub payback_years: f64,
    /// Avoided emissions per year (kg CO₂).
    pub co2_offset_kg_per_yr: f64,
    /// Equivalent mature trees absorbing that CO₂.
    pub equivalent_trees: f64,
    /// Whether total cost fits the stated budget.
    pub within_budget: bool,
}

impl fmt::Display for FinancialEstimates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Financials ---")?;
        writeln!(f, "Equipment cost:        {:.0}", self.equipment_cost)?;
        writeln!(
            f,
            "Total installed cost:  {:.0}{}",
            self.total_cost,
            if self.within_budget { "" } else { "  (over budget)" }
        )?;
        writeln!(f, "Annual production:     {:.0} kWh", self.annual_production_kwh)?;
        writeln!(
            f,
            "Lifetime production:   {:.0} kWh over {} years",
            self.lifetime_production_kwh,
            self.yearly_production_kwh.len()
        )?;
        writeln!(f, "NPV @ {:.0}%:             {:.0}", DISCOUNT_RATE * 100.0, self.npv)?;
        match self.irr {
            Some(irr) if self.irr_converged => writeln!(f, "IRR:                   {:.1}%", irr * 100.0)?,
            Some(irr) => writeln!(f, "IRR:                   ~{:.1}% (approximate)", irr * 100.0)?,
            None => writeln!(f, "IRR:                   none in range")?,
        }
        if self.lcoe.is_finite() {
            writeln!(f, "LCOE:                  {:.3} / kWh", self.lcoe)?;
        } else {
            writeln!(f, "LCOE:                  n/a")?;
        }
        if self.payback_years.is_finite() {
            writeln!(f, "Payback:               {:.1} years", self.payback_years)?;
        } else {
            writeln!(f, "Payback:               never")?;
        }
        write!(
            f,
            "CO2 avoided:           {:.0} kg/yr (~{:.0} trees)",
            self.co2_offset_kg_per_yr, self.equivalent_trees
        )
    }
}

/// One year of the undiscounted cash-flow schedule.
#[derive(Debug, Clone, Serialize)]
pub struct CashFlowYear {
    /// Schedule year; year 0 carries the installed cost.
    pub year: u32,
    /// Production in this year (kWh).
    pub production_kwh: f64,
    /// Electricity revenue in this year.
    pub revenue: f64,
    /// O&M cost in this year.
    pub om_cost: f64,
    /// Net cash flow of this year.
    pub net_cash_flow: f64,
    /// Running total including the year-0 outlay.
    pub cumulative_cash_flow: f64,
}

impl FinancialEstimates {
    /// Year-by-year undiscounted schedule: the year-0 outlay followed by
    /// one row per production year.
    pub fn cash_flow_schedule(&self) -> Vec<CashFlowYear> {
        let om_cost = self.total_cost * OM_RATE;
        let mut rows = Vec::with_capacity(self.yearly_production_kwh.len() + 1);
        let mut cumulative = -self.total_cost;
        rows.push(CashFlowYear {
            year: 0,
            production_kwh: 0.0,
            revenue: 0.0,
            om_cost: 0.0,
            net_cash_flow: -self.total_cost,
            cumulative_cash_flow: cumulative,
        });
        for (y, kwh) in self.yearly_production_kwh.iter().enumerate() {
            let revenue = kwh * ELECTRICITY_PRICE_PER_KWH;
            let net = revenue - om_cost;
            cumulative += net;
            rows.push(CashFlowYear {
                year: y as u32 + 1,
                production_kwh: *kwh,
                revenue,
                om_cost,
                net_cash_flow: net,
                cumulative_cash_flow: cumulative,
            });
        }
        rows
    }
}

/// Computes cost, degradation-adjusted production, and discounted
/// cash-flow metrics for the winning selection.
#[derive(Debug, Default, Clone, Copy)]
pub struct FinancialEstimator;

impl FinancialEstimator {
    /// Produces the full estimate for a selection at a location.
    pub fn estimate(
        selection: &EquipmentSelection,
        location: &LocationFactors,
        requirements: &DesignRequirements,
    ) -> FinancialEstimates {
        let equipment_cost = selection.panel_signals.price
            * f64::from(selection.array.total_panels)
            + selection.inverter_signals.price;
        let total_cost = equipment_cost * INSTALL_MARKUP;

        let annual_production_kwh = selection.array.total_power_w / 1000.0
            * location.solar_irradiance_kwh_m2_yr
            * SYSTEM_EFFICIENCY
            * PERFORMANCE_RATIO
            * location.availability
            * (1.0 - location.soiling_loss_fraction);

        let mut estimates = Self::cash_flow_metrics(
            total_cost,
            annual_production_kwh,
            location.degradation_rate_per_yr,
        );
        estimates.equipment_cost = equipment_cost;
        estimates.within_budget = total_cost <= requirements.design.budget;
        estimates
    }

    /// Discounted-cash-flow core: year 0 pays the installed cost, years
    /// 1..=25 earn degradation-adjusted revenue minus O&M.
    pub fn cash_flow_metrics(
        total_cost: f64,
        annual_production_kwh: f64,
        degradation_rate_per_yr: f64,
    ) -> FinancialEstimates {
        let yearly_production_kwh: Vec<f64> = (0..LIFETIME_YEARS)
            .map(|y| annual_production_kwh * (1.0 - degradation_rate_per_yr).powi(y as i32))
            .collect();
        let lifetime_production_kwh = yearly_production_kwh.iter().sum();

        let om_cost = total_cost * OM_RATE;
        let npv = npv_at(DISCOUNT_RATE, total_cost, &yearly_production_kwh, om_cost);
        let (irr, irr_converged) = irr_bisection(total_cost, &yearly_production_kwh, om_cost);

        let discounted_cost: f64 = total_cost
            + (1..=LIFETIME_YEARS)
                .map(|y| om_cost / (1.0 + DISCOUNT_RATE).powi(y as i32))
                .sum::<f64>();
        let discounted_energy: f64 = yearly_production_kwh
            .iter()
            .enumerate()
            .map(|(y, kwh)| kwh / (1.0 + DISCOUNT_RATE).powi(y as i32 + 1))
            .sum();
        let lcoe = if discounted_energy > 0.0 {
            discounted_cost / discounted_energy
        } else {
            f64::INFINITY
        };

        let net_annual = annual_production_kwh * ELECTRICITY_PRICE_PER_KWH - om_cost;
        let payback_years = if net_annual > 0.0 {
            total_cost / net_annual
        } else {
            f64::INFINITY
        };

        let co2_offset_kg_per_yr = annual_production_kwh * GRID_EMISSION_KG_PER_KWH;
        let equivalent_trees = co2_offset_kg_per_yr / KG_CO2_PER_TREE_PER_YR;

        FinancialEstimates {
            equipment_cost: total_cost / INSTALL_MARKUP,
            total_cost,
            annual_production_kwh,
            yearly_production_kwh,
            lifetime_production_kwh,
            npv,
            irr,
            irr_converged,
            lcoe,
            payback_years,
            co2_offset_kg_per_yr,
            equivalent_trees,
            within_budget: true,
        }
    }
}

/// NPV of the project cash flows at a given discount rate.
fn npv_at(rate: f64, total_cost: f64, yearly_production_kwh: &[f64], om_cost: f64) -> f64 {
    let mut npv = -total_cost;
    for (y, kwh) in yearly_production_kwh.iter().enumerate() {
        let cash_flow = kwh * ELECTRICITY_PRICE_PER_KWH - om_cost;
        npv += cash_flow / (1.0 + rate).powi(y as i32 + 1);
    }
    npv
}

/// Bracketed bisection for the rate where NPV crosses zero.
///
/// Returns `(None, false)` when NPV does not change sign on the bracket
/// (the project never breaks even, or breaks even outside sane rates).
/// On cap exhaustion the midpoint is returned with `converged = false`.
fn irr_bisection(
    total_cost: f64,
    yearly_production_kwh: &[f64],
    om_cost: f64,
) -> (Option<f64>, bool) {
    let mut lo = IRR_RATE_MIN;
    let mut hi = IRR_RATE_MAX;
    let mut npv_lo = npv_at(lo, total_cost, yearly_production_kwh, om_cost);
    let npv_hi = npv_at(hi, total_cost, yearly_production_kwh, om_cost);

    if npv_lo * npv_hi > 0.0 {
        return (None, false);
    }

    for _ in 0..IRR_MAX_ITERATIONS {
        let mid = (lo + hi) / 2.0;
        let npv_mid = npv_at(mid, total_cost, yearly_production_kwh, om_cost);
        if npv_mid.abs() <= IRR_NPV_TOLERANCE {
            return (Some(mid), true);
        }
        if npv_lo * npv_mid <= 0.0 {
            hi = mid;
        } else {
            lo = mid;
            npv_lo = npv_mid;
        }
    }

    (Some((lo + hi) / 2.0), false)
}
