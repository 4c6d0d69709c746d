// apps/pb_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 列出已注册的子模型与默认求解控制。

use anyhow::{bail, Result};
use clap::Args;
use pb_config::SolverDict;
use pb_physics::ModelRegistry;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 只显示该模型族（coalescence, breakup, binaryBreakup, modelSource, daughterSizeDistribution）
    #[arg(short, long)]
    pub family: Option<String>,

    /// 显示默认 solverDict
    #[arg(long)]
    pub defaults: bool,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    let registry = ModelRegistry::with_defaults();

    match &args.family {
        Some(family) => {
            if !ModelRegistry::families().iter().any(|f| *f == family.as_str()) {
                bail!(
                    "未知模型族 '{}'，可选: {}",
                    family,
                    ModelRegistry::families().join(", ")
                );
            }
            print_family(&registry, family);
        }
        None => {
            println!("=== PolyBal {} ===", env!("CARGO_PKG_VERSION"));
            for family in ModelRegistry::families() {
                print_family(&registry, family);
            }
        }
    }

    if args.defaults {
        println!("\n=== 默认 solverDict ===");
        println!("{}", serde_json::to_string_pretty(&SolverDict::default())?);
    }

    Ok(())
}

fn print_family(registry: &ModelRegistry, family: &str) {
    println!("\n{}:", family);
    for name in registry.names(family) {
        println!("  - {}", name);
    }
}
