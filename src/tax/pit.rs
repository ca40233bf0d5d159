//! Personal income tax: the progressive bracket calculator and the 2025 vs 2026 regimes.

use crate::model::Vnd;
use crate::Result;
use anyhow::{bail, ensure, Context};
use clap::ValueEnum;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A dependent with monthly income above this cannot be registered for the dependent deduction.
pub const DEPENDENT_INCOME_LIMIT: Vnd = Vnd::new(dec!(1000000));

/// One band of a progressive tax table. `limit` is the inclusive upper bound of the band, `None`
/// for the last, unbounded band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitBracket {
    pub limit: Option<Decimal>,
    pub rate: Decimal,
}

const fn bracket(limit: Decimal, rate: Decimal) -> PitBracket {
    PitBracket {
        limit: Some(limit),
        rate,
    }
}

const fn top(rate: Decimal) -> PitBracket {
    PitBracket { limit: None, rate }
}

const BRACKETS_2025: [PitBracket; 7] = [
    bracket(dec!(5000000), dec!(0.05)),
    bracket(dec!(10000000), dec!(0.10)),
    bracket(dec!(18000000), dec!(0.15)),
    bracket(dec!(32000000), dec!(0.20)),
    bracket(dec!(52000000), dec!(0.25)),
    bracket(dec!(80000000), dec!(0.30)),
    top(dec!(0.35)),
];

const BRACKETS_2026: [PitBracket; 5] = [
    bracket(dec!(10000000), dec!(0.05)),
    bracket(dec!(30000000), dec!(0.15)),
    bracket(dec!(60000000), dec!(0.25)),
    bracket(dec!(100000000), dec!(0.30)),
    top(dec!(0.35)),
];

/// A bracket table that has been checked: limits strictly increase, only the last band is
/// unbounded, and rates are in `[0, 1]` and never decrease.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Brackets(Vec<PitBracket>);

impl Brackets {
    pub fn new(brackets: Vec<PitBracket>) -> Result<Self> {
        let Some((last, rest)) = brackets.split_last() else {
            bail!("A bracket table needs at least one bracket");
        };
        ensure!(
            last.limit.is_none(),
            "The last bracket must be unbounded"
        );

        let mut previous_limit = Decimal::ZERO;
        let mut previous_rate = Decimal::ZERO;
        for (ix, b) in brackets.iter().enumerate() {
            ensure!(
                b.rate >= Decimal::ZERO && b.rate <= Decimal::ONE,
                "Bracket {} has a rate outside of [0, 1]",
                ix + 1
            );
            ensure!(
                b.rate >= previous_rate,
                "Bracket {} has a lower rate than the bracket before it",
                ix + 1
            );
            previous_rate = b.rate;
        }
        for (ix, b) in rest.iter().enumerate() {
            let limit = b
                .limit
                .with_context(|| format!("Only the last bracket may be unbounded, not {}", ix + 1))?;
            ensure!(
                limit > previous_limit,
                "Bracket limits must be strictly increasing, bracket {} is not",
                ix + 1
            );
            previous_limit = limit;
        }
        Ok(Self(brackets))
    }

    pub fn tax(&self, income: Vnd) -> Vnd {
        progressive_tax(income, &self.0)
    }
}

/// Σ over brackets ascending of `rate × (min(income, limit) − previous_limit)`. A bracket
/// contributes only while `income > previous_limit`, so an income exactly on a limit is taxed
/// entirely in the lower bracket. No rounding is applied.
pub fn progressive_tax(income: Vnd, brackets: &[PitBracket]) -> Vnd {
    let income = income.value();
    if income <= Decimal::ZERO {
        return Vnd::ZERO;
    }
    let mut tax = Decimal::ZERO;
    let mut previous_limit = Decimal::ZERO;
    for b in brackets {
        if income <= previous_limit {
            break;
        }
        let upper = match b.limit {
            Some(limit) => income.min(limit),
            None => income,
        };
        tax += (upper - previous_limit) * b.rate;
        match b.limit {
            Some(limit) => previous_limit = limit,
            None => break,
        }
    }
    Vnd::new(tax)
}

/// The tax law in force.
#[derive(
    Debug,
    Default,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    ValueEnum,
)]
pub enum PitRegime {
    /// Current law: 7 brackets, 11M personal deduction.
    #[serde(rename = "2025")]
    #[value(name = "2025")]
    Y2025,
    /// From 2026: 5 brackets, 15.5M personal deduction.
    #[default]
    #[serde(rename = "2026")]
    #[value(name = "2026")]
    Y2026,
}

serde_plain::derive_display_from_serialize!(PitRegime);

impl PitRegime {
    pub fn personal_deduction(&self) -> Vnd {
        match self {
            PitRegime::Y2025 => Vnd::new(dec!(11000000)),
            PitRegime::Y2026 => Vnd::new(dec!(15500000)),
        }
    }

    pub fn dependent_deduction(&self) -> Vnd {
        match self {
            PitRegime::Y2025 => Vnd::new(dec!(4400000)),
            PitRegime::Y2026 => Vnd::new(dec!(6200000)),
        }
    }

    /// The bracket table of the regime, checked before use.
    pub fn brackets(&self) -> Result<Brackets> {
        let table: &[PitBracket] = match self {
            PitRegime::Y2025 => &BRACKETS_2025,
            PitRegime::Y2026 => &BRACKETS_2026,
        };
        Brackets::new(table.to_vec()).with_context(|| format!("Invalid {self} bracket table"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitEstimate {
    pub regime: PitRegime,
    pub income: Vnd,
    pub dependents: u32,
    pub deductions: Vnd,
    pub taxable_income: Vnd,
    pub tax: Vnd,
}

/// Monthly PIT under `regime`. Deductions are the personal deduction plus one dependent deduction
/// per dependent; the rest is run through the bracket table.
pub fn estimate(regime: PitRegime, monthly_income: Vnd, dependents: u32) -> Result<PitEstimate> {
    let deductions =
        regime.personal_deduction() + regime.dependent_deduction() * Decimal::from(dependents);
    let taxable_income = (monthly_income - deductions).non_negative();
    let tax = regime.brackets()?.tax(taxable_income);
    Ok(PitEstimate {
        regime,
        income: monthly_income,
        dependents,
        deductions,
        taxable_income,
        tax,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PitComparison {
    pub current: PitEstimate,
    pub proposed: PitEstimate,
    /// `current.tax - proposed.tax`. Negative when the taxpayer pays more under 2026 rules.
    pub savings: Vnd,
}

pub fn compare(monthly_income: Vnd, dependents: u32) -> Result<PitComparison> {
    let current = estimate(PitRegime::Y2025, monthly_income, dependents)?;
    let proposed = estimate(PitRegime::Y2026, monthly_income, dependents)?;
    let savings = current.tax - proposed.tax;
    Ok(PitComparison {
        current,
        proposed,
        savings,
    })
}

/// A person the taxpayer wants to claim as a dependent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dependent {
    pub name: String,
    pub monthly_income: Vnd,
}

impl Dependent {
    /// False when the dependent's own income is above the limit. Claiming such a dependent risks
    /// having the deduction clawed back.
    pub fn is_eligible(&self) -> bool {
        self.monthly_income <= DEPENDENT_INCOME_LIMIT
    }
}

/// Parses `Name=MonthlyIncome`, e.g. `Mẹ=4.000.000`. A bare name has zero income.
impl FromStr for Dependent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (name, income) = match s.rsplit_once('=') {
            Some((name, income)) => (
                name,
                Vnd::from_str(income)
                    .with_context(|| format!("Invalid income for dependent '{s}'"))?,
            ),
            None => (s, Vnd::ZERO),
        };
        let name = name.trim();
        ensure!(!name.is_empty(), "A dependent needs a name");
        Ok(Self {
            name: name.to_string(),
            monthly_income: income,
        })
    }
}

pub fn eligible_count(dependents: &[Dependent]) -> u32 {
    dependents.iter().filter(|d| d.is_eligible()).count() as u32
}
