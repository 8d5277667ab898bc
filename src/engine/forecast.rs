// ==========================================
// 项目组合决策引擎 - 职能资源需求预测
// ==========================================
// 方法: Holt 线性趋势指数平滑
// 参数: α, β 在 {0.1, ..., 0.9} 网格上按一步预测误差平方和最小选取
// 区间: 点预测 ± z × σ_h，σ_h 随预测步长增大
// ==========================================
// 约定:
// - 历史期数 < min_history 时返回 Unavailable，不做外推
// - 点预测与区间下界 >= 0
// ==========================================

use crate::config::EngineConfig;
use crate::domain::forecast::{
    DemandPoint, DemandSeries, ForecastOutcome, ForecastPoint, ForecastUnavailableReason,
    ResourceForecast,
};
use chrono::{Datelike, Duration, Months, NaiveDate};
use statrs::distribution::{ContinuousCDF, Normal};
use tracing::{debug, info, instrument};

const GRID: [f64; 9] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9];

/// 单组平滑参数的拟合结果
#[derive(Debug, Clone, Copy)]
struct HoltFit {
    alpha: f64,
    beta: f64,
    level: f64,
    trend: f64,
    sse: f64,
    errors: usize,
}

fn holt_fit(values: &[f64], alpha: f64, beta: f64) -> HoltFit {
    let mut level = values[0];
    let mut trend = values[1] - values[0];
    let mut sse = 0.0;
    let mut errors = 0;

    for (t, y) in values.iter().enumerate().skip(1) {
        let predicted = level + trend;
        // 第 1 期的预测由初始趋势决定，误差恒为 0，不计入
        if t >= 2 {
            let e = y - predicted;
            sse += e * e;
            errors += 1;
        }
        let new_level = alpha * y + (1.0 - alpha) * predicted;
        trend = beta * (new_level - level) + (1.0 - beta) * trend;
        level = new_level;
    }

    HoltFit {
        alpha,
        beta,
        level,
        trend,
        sse,
        errors,
    }
}

// ==========================================
// DemandForecaster - 需求预测器
// ==========================================
#[derive(Debug, Clone)]
pub struct DemandForecaster {
    min_history: usize,
    horizon: usize,
    confidence: f64,
}

impl DemandForecaster {
    pub fn new(min_history: usize, horizon: usize, confidence: f64) -> Self {
        Self {
            min_history,
            horizon,
            confidence,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.forecast_min_history,
            config.forecast_horizon,
            config.forecast_confidence,
        )
    }

    /// 预测单个职能的未来需求
    ///
    /// # 返回
    /// - Available: 含每期点预测与区间
    /// - Unavailable: 历史不足或含非法值
    #[instrument(skip(self, series), fields(function = %series.function, history = series.len()))]
    pub fn forecast(&self, series: &DemandSeries) -> ForecastOutcome {
        let required = self.min_history.max(3);
        if series.len() < required {
            debug!(required = required, "历史期数不足，不做预测");
            return ForecastOutcome::Unavailable {
                function: series.function.clone(),
                reason: ForecastUnavailableReason::InsufficientHistory {
                    required,
                    actual: series.len(),
                },
            };
        }

        let mut points = series.points.clone();
        points.sort_by_key(|p| p.period);

        if let Some((index, p)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.fte.is_finite() || p.fte < 0.0)
        {
            return ForecastOutcome::Unavailable {
                function: series.function.clone(),
                reason: ForecastUnavailableReason::InvalidValue {
                    index,
                    value: p.fte,
                },
            };
        }

        let values: Vec<f64> = points.iter().map(|p| p.fte).collect();

        // 1. 网格搜索（误差相同取先出现者）
        let mut best: Option<HoltFit> = None;
        for alpha in GRID {
            for beta in GRID {
                let fit = holt_fit(&values, alpha, beta);
                match best {
                    Some(b) if b.sse <= fit.sse => {}
                    _ => best = Some(fit),
                }
            }
        }
        let Some(fit) = best else {
            return ForecastOutcome::Unavailable {
                function: series.function.clone(),
                reason: ForecastUnavailableReason::InsufficientHistory {
                    required,
                    actual: series.len(),
                },
            };
        };

        // 2. 区间
        let residual_std = if fit.errors > 0 {
            (fit.sse / fit.errors as f64).sqrt()
        } else {
            0.0
        };
        // 标准正态参数恒合法
        let z = Normal::new(0.0, 1.0)
            .map(|n| n.inverse_cdf(0.5 + self.confidence / 2.0))
            .unwrap_or(0.0);

        let last_period = points.last().map(|p| p.period);
        let step = PeriodStep::infer(&points);

        let mut forecast_points = Vec::with_capacity(self.horizon);
        let mut variance_factor = 1.0;
        for h in 1..=self.horizon {
            if h > 1 {
                let j = (h - 1) as f64;
                variance_factor += fit.alpha.powi(2) * (1.0 + j * fit.beta).powi(2);
            }
            let raw = fit.level + h as f64 * fit.trend;
            let point = raw.max(0.0);
            let width = z * residual_std * variance_factor.sqrt();

            forecast_points.push(ForecastPoint {
                step: h as u32,
                period: last_period.and_then(|last| step.and_then(|s| s.advance(last, h))),
                point,
                lower: (point - width).max(0.0),
                upper: (point + width).max(point),
            });
        }

        info!(
            alpha = fit.alpha,
            beta = fit.beta,
            residual_std = residual_std,
            "需求预测完成"
        );

        ForecastOutcome::Available(ResourceForecast {
            function: series.function.clone(),
            alpha: fit.alpha,
            beta: fit.beta,
            residual_std,
            confidence: self.confidence,
            points: forecast_points,
        })
    }

    /// 批量预测（各职能互不影响，顺序与输入一致）
    pub fn forecast_all(&self, series: &[DemandSeries]) -> Vec<ForecastOutcome> {
        series.iter().map(|s| self.forecast(s)).collect()
    }
}

// ==========================================
// 期间步长推断
// ==========================================
// 所有期间都是月初时按自然月推进，否则按天
#[derive(Debug, Clone, Copy, PartialEq)]
enum PeriodStep {
    Months(u32),
    Days(i64),
}

impl PeriodStep {
    fn infer(points: &[DemandPoint]) -> Option<Self> {
        if points.len() < 2 {
            return None;
        }
        if points.iter().all(|p| p.period.day() == 1) {
            let diffs: Vec<i64> = points
                .windows(2)
                .map(|w| month_index(w[1].period) - month_index(w[0].period))
                .collect();
            let m = median(diffs)?;
            (m > 0).then_some(PeriodStep::Months(m as u32))
        } else {
            let diffs: Vec<i64> = points
                .windows(2)
                .map(|w| (w[1].period - w[0].period).num_days())
                .collect();
            let d = median(diffs)?;
            (d > 0).then_some(PeriodStep::Days(d))
        }
    }

    fn advance(&self, from: NaiveDate, steps: usize) -> Option<NaiveDate> {
        match *self {
            PeriodStep::Months(m) => from.checked_add_months(Months::new(m * steps as u32)),
            PeriodStep::Days(d) => from.checked_add_signed(Duration::days(d * steps as i64)),
        }
    }
}

fn month_index(date: NaiveDate) -> i64 {
    date.year() as i64 * 12 + date.month0() as i64
}

fn median(mut values: Vec<i64>) -> Option<i64> {
    if values.is_empty() {
        return None;
    }
    values.sort_unstable();
    Some(values[(values.len() - 1) / 2])
}
