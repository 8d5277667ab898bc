// ==========================================
// 项目组合决策引擎 - 命令行入口
// ==========================================
// 用法:
//   pmo-portfolio-engine <projects.csv|xlsx|json> <constraints.json> [选项]
//
// 选项:
//   --objective <maximize_strategic_value|minimize_risk|maximize_on_strategy_count>
//   --as-of <YYYY-MM-DD>        评估日期（默认今天）
//   --config <config.json>      引擎配置覆写
//   --history <history.csv>     历史已完成项目（用于训练延期模型）
//   --demand <demand.csv>       职能需求历史（输出需求预测）
//
// 结果以 JSON 输出到 stdout，日志输出到 stderr
// ==========================================

use anyhow::{bail, Context, Result};
use chrono::{Local, NaiveDate};
use pmo_portfolio_engine::config::ConfigManager;
use pmo_portfolio_engine::importer::{load_constraints, DemandHistoryLoader, ProjectTableLoader};
use pmo_portfolio_engine::{logging, ObjectiveKind, PortfolioApi};
use serde_json::json;
use std::path::PathBuf;

struct CliArgs {
    projects: PathBuf,
    constraints: PathBuf,
    objective: ObjectiveKind,
    as_of: NaiveDate,
    config: Option<PathBuf>,
    history: Option<PathBuf>,
    demand: Option<PathBuf>,
}

fn parse_args() -> Result<CliArgs> {
    let mut positional = Vec::new();
    let mut objective = ObjectiveKind::default();
    let mut as_of = Local::now().date_naive();
    let mut config = None;
    let mut history = None;
    let mut demand = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .with_context(|| format!("选项 {} 缺少取值", name))
        };
        match arg.as_str() {
            "--objective" => {
                objective = value("--objective")?
                    .parse()
                    .map_err(anyhow::Error::msg)?;
            }
            "--as-of" => {
                let raw = value("--as-of")?;
                as_of = NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                    .with_context(|| format!("评估日期格式错误: {}", raw))?;
            }
            "--config" => config = Some(PathBuf::from(value("--config")?)),
            "--history" => history = Some(PathBuf::from(value("--history")?)),
            "--demand" => demand = Some(PathBuf::from(value("--demand")?)),
            other if other.starts_with("--") => bail!("未知选项: {}", other),
            other => positional.push(PathBuf::from(other)),
        }
    }

    if positional.len() != 2 {
        bail!("用法: pmo-portfolio-engine <projects> <constraints.json> [--objective ..] [--as-of ..] [--config ..] [--history ..] [--demand ..]");
    }
    let constraints = positional.pop().context("缺少约束文件")?;
    let projects = positional.pop().context("缺少项目表文件")?;

    Ok(CliArgs {
        projects,
        constraints,
        objective,
        as_of,
        config,
        history,
        demand,
    })
}

fn main() -> Result<()> {
    logging::init();
    let args = parse_args()?;

    tracing::info!("==================================================");
    tracing::info!("{} v{}", pmo_portfolio_engine::APP_NAME, pmo_portfolio_engine::VERSION);
    tracing::info!("==================================================");

    let manager = match &args.config {
        Some(path) => ConfigManager::from_json_file(path)
            .with_context(|| format!("加载配置失败: {}", path.display()))?,
        None => ConfigManager::new(),
    };
    let config = manager.engine_config()?;

    let loader = ProjectTableLoader::new();
    let api = match &args.history {
        Some(path) => {
            let history = loader.load(path)?;
            PortfolioApi::with_history(config, &history.projects, args.as_of)?
        }
        None => PortfolioApi::new(config)?,
    };

    let table = loader
        .load(&args.projects)
        .with_context(|| format!("加载项目表失败: {}", args.projects.display()))?;
    let constraints = load_constraints(&args.constraints)
        .with_context(|| format!("加载约束失败: {}", args.constraints.display()))?;

    let decision = api.decide(&table.projects, args.as_of, args.objective, &constraints)?;

    let forecasts = match &args.demand {
        Some(path) => {
            let series = DemandHistoryLoader::new().load(path)?;
            Some(api.forecast_demand(&series))
        }
        None => None,
    };

    let output = json!({
        "decision": decision,
        "rejected_rows": table.rejected,
        "forecasts": forecasts,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
