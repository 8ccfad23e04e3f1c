//! Moving switches and diodes to the positions of a parsed layout.

use indexmap::IndexMap;
use kleplate_core::{Key, Vec2};
use kleplate_core::units::layout_to_board_mil;
use kleplate_parser::parse_keys;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{PlacementConfig, PlacementPayload};
use crate::error::{Error, ValidationError, Warning};
use crate::host::{Component, ComponentMove, DesignHost};

/// At most this many duplicate numbers are listed in a warning.
pub const MAX_REPORTED_DUPLICATES: usize = 20;

pub const SWITCH_PREFIX: &str = "SW";
pub const DIODE_PREFIX: &str = "D";

/// One move the host was asked to perform.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacementInstruction {
    pub designator: String,
    pub component_id: String,
    pub target: ComponentMove,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlacementReport {
    pub switches_placed: usize,
    pub diodes_placed: usize,
    pub switches_missing: usize,
    pub diodes_missing: usize,
    pub warnings: Vec<Warning>,
    pub instructions: Vec<PlacementInstruction>,
}

/// Designator numbers used by more than one key, first-seen order, capped.
#[must_use]
pub fn duplicate_hints(keys: &[Key]) -> Vec<u32> {
    let mut seen: IndexMap<u32, usize> = IndexMap::new();
    for n in keys.iter().filter_map(|k| k.designator_hint) {
        *seen.entry(n).or_insert(0) += 1;
    }
    seen.into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(n, _)| n)
        .take(MAX_REPORTED_DUPLICATES)
        .collect()
}

/// Host pose for a layout point: mils, Y up, rotation negated.
fn target_for(position: Vec2, rotation_degrees: f64, pitch_mm: f64) -> ComponentMove {
    let p = layout_to_board_mil(position, pitch_mm);
    ComponentMove {
        x: p.x,
        y: p.y,
        rotation: -rotation_degrees,
    }
}

/// Parse the layout and move every `SW<n>` (and optionally `D<n>`) component it names.
///
/// Keys without a designator hint are ignored; designators missing from the host are counted in the
/// report rather than failing the call.
pub fn place_keys<H>(host: &mut H, payload: &PlacementPayload) -> Result<PlacementReport, Error>
where
    H: DesignHost + ?Sized,
{
    let config = payload.validate()?;
    let diode_offset_u = Vec2::new(
        config.diode_offset_mm.x / config.pitch_mm,
        config.diode_offset_mm.y / config.pitch_mm,
    );
    let keys = parse_keys(&payload.layout, diode_offset_u)?;
    place_parsed_keys(host, &keys, &config)
}

/// Placement for keys that were already parsed with the diode offset applied.
pub fn place_parsed_keys<H>(
    host: &mut H,
    keys: &[Key],
    config: &PlacementConfig,
) -> Result<PlacementReport, Error>
where
    H: DesignHost + ?Sized,
{
    let hinted: Vec<(&Key, u32)> = keys
        .iter()
        .filter_map(|k| k.designator_hint.map(|n| (k, n)))
        .collect();
    if hinted.is_empty() {
        return Err(ValidationError::NoDesignatorHints.into());
    }

    let mut report = PlacementReport::default();
    let duplicates = duplicate_hints(keys);
    if !duplicates.is_empty() {
        let warning = Warning::DuplicateDesignators {
            numbers: duplicates,
        };
        warn!("{warning}");
        report.warnings.push(warning);
    }

    // The first component carrying a designator wins.
    let components = host.components()?;
    let mut by_designator: IndexMap<&str, &Component> = IndexMap::new();
    for c in &components {
        by_designator.entry(c.designator.as_str()).or_insert(c);
    }

    let mut planned: Vec<PlacementInstruction> = Vec::new();
    for (key, n) in hinted {
        let switch = format!("{SWITCH_PREFIX}{n}");
        match by_designator.get(switch.as_str()) {
            Some(c) => {
                planned.push(PlacementInstruction {
                    designator: switch,
                    component_id: c.id.clone(),
                    target: target_for(key.position, key.rotation_degrees, config.pitch_mm),
                });
                report.switches_placed += 1;
            }
            None => {
                debug!(designator = %switch, "switch not on board");
                report.switches_missing += 1;
            }
        }

        if !config.do_diode {
            continue;
        }
        let diode = format!("{DIODE_PREFIX}{n}");
        match by_designator.get(diode.as_str()) {
            Some(c) => {
                planned.push(PlacementInstruction {
                    designator: diode,
                    component_id: c.id.clone(),
                    target: target_for(
                        key.diode_offset_position,
                        key.rotation_degrees,
                        config.pitch_mm,
                    ),
                });
                report.diodes_placed += 1;
            }
            None => {
                debug!(designator = %diode, "diode not on board");
                report.diodes_missing += 1;
            }
        }
    }

    for instruction in &planned {
        host.move_component(&instruction.component_id, &instruction.target)?;
    }
    report.instructions = planned;

    info!(
        switches = report.switches_placed,
        diodes = report.diodes_placed,
        missing_switches = report.switches_missing,
        missing_diodes = report.diodes_missing,
        pitch_mm = config.pitch_mm,
        "placement applied"
    );
    Ok(report)
}
