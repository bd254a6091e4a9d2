use std::fmt::Write as _;
use std::path::PathBuf;

use interpose_core::Colors;
use interpose_gen::{DispatchPlan, GenerationContext, MemberOrigin, collect_dispatch_plan};
use serde_json::json;

use super::CliError;
use super::surface_loader::load_surface;

pub struct PlanArgs {
    pub surface_path: PathBuf,
    pub json: bool,
    pub color: bool,
}

pub fn run(args: PlanArgs) -> Result<String, CliError> {
    let surface = load_surface(&args.surface_path)?;
    let plan = collect_dispatch_plan(&surface, &GenerationContext::default())?;
    Ok(if args.json {
        render_json(&plan)
    } else {
        render_text(&plan, Colors::new(args.color))
    })
}

fn origin_label(origin: MemberOrigin) -> &'static str {
    match origin {
        MemberOrigin::Universal => "universal",
        MemberOrigin::Base => "base",
        MemberOrigin::Interface => "interface",
    }
}

/// One line per member: slot, dispatch id, origin, key, declaring type.
pub fn render_text(plan: &DispatchPlan<'_>, colors: Colors) -> String {
    let mut out = String::new();
    if let Some(base) = plan.base {
        writeln!(out, "base {}", colors.paint(colors.blue, &base.name)).unwrap();
    }

    let width = plan.members.iter().map(|m| m.key().len()).max().unwrap_or(0);
    for member in &plan.members {
        let slot = format!("m{:<4}", member.slot);
        let key = format!("{:<width$}", member.key());
        writeln!(
            out,
            "{} {:>11}  {:<9}  {}  {}",
            colors.paint(colors.dim, slot),
            colors.paint(colors.green, member.dispatch_id),
            origin_label(member.origin),
            colors.paint(colors.blue, key),
            colors.paint(colors.dim, &member.declaring),
        )
        .unwrap();
    }
    out
}

pub fn render_json(plan: &DispatchPlan<'_>) -> String {
    let members: Vec<_> = plan
        .members
        .iter()
        .map(|m| {
            json!({
                "slot": m.slot,
                "key": m.key(),
                "origin": origin_label(m.origin),
                "declaring": m.declaring,
                "id": m.dispatch_id,
            })
        })
        .collect();
    let plan = json!({
        "base": plan.base.map(|b| b.name.as_str()),
        "members": members,
    });
    format!("{plan:#}\n")
}
