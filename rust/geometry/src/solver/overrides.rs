// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Element-kind overrides - per-kind reassignment of the ranked candidates
//!
//! Each element kind owns an ordered chain of overrides followed by a list of
//! checks. The first override that returns a new assignment wins; when none
//! applies the ranked order stands. Checks then run on the final assignment.

use super::validation::validate_end_points;
use crate::circle::Circularity;
use crate::error::{Error, Result};
use crate::tolerance::Tolerances;
use crate::types::{DimensionCandidate, ElementHint, ElementKind};
use crate::vector::{angle_to_vertical, distance_to_line};
use nalgebra::Point3;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Location, length and width candidates in assignment order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Assignment {
    pub location: DimensionCandidate,
    pub length: DimensionCandidate,
    pub width: DimensionCandidate,
}

impl Assignment {
    pub fn from_ranked(ranked: [DimensionCandidate; 3]) -> Self {
        let [location, length, width] = ranked;
        Self {
            location,
            length,
            width,
        }
    }

    pub fn candidates(&self) -> [DimensionCandidate; 3] {
        [self.location, self.length, self.width]
    }

    /// Make candidate `index` the location; the other two go longer-first
    pub fn with_location(&self, index: usize) -> Self {
        let all = self.candidates();
        let location = all[index];
        let mut rest: Vec<DimensionCandidate> = all
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, c)| *c)
            .collect();
        rest.sort_by(|a, b| b.length().total_cmp(&a.length()));
        Self {
            location,
            length: rest[0],
            width: rest[1],
        }
    }
}

/// Everything an override may look at besides the candidates
pub struct OverrideContext<'a> {
    pub vertices: &'a [Point3<f64>],
    pub hint: &'a ElementHint,
    pub tolerances: &'a Tolerances,
}

/// Reassigns candidates for the element kinds it supports
pub trait AxisOverride: Send + Sync {
    fn name(&self) -> &'static str;

    /// `Ok(Some(_))` resolves the chain, `Ok(None)` passes to the next override
    fn apply(&self, ctx: &OverrideContext<'_>, assignment: &Assignment) -> Result<Option<Assignment>>;

    /// Element kinds whose chain this override joins
    fn supported_kinds(&self) -> Vec<ElementKind>;
}

/// Rejects a final assignment for the element kinds it supports
pub trait AxisCheck: Send + Sync {
    fn name(&self) -> &'static str;

    fn check(&self, ctx: &OverrideContext<'_>, assignment: &Assignment) -> Result<()>;

    fn supported_kinds(&self) -> Vec<ElementKind>;
}

#[derive(Default, Clone)]
struct KindRules {
    overrides: Vec<Arc<dyn AxisOverride>>,
    checks: Vec<Arc<dyn AxisCheck>>,
}

/// Override registry - routes an assignment through its kind's chain
#[derive(Clone)]
pub struct OverrideRegistry {
    rules: FxHashMap<ElementKind, KindRules>,
}

impl OverrideRegistry {
    /// Registry with no rules: every kind keeps the ranked order
    pub fn empty() -> Self {
        Self {
            rules: FxHashMap::default(),
        }
    }

    /// Append an override to the chain of every kind it supports
    pub fn register(&mut self, rule: Box<dyn AxisOverride>) {
        let rule: Arc<dyn AxisOverride> = Arc::from(rule);
        for kind in rule.supported_kinds() {
            self.rules.entry(kind).or_default().overrides.push(Arc::clone(&rule));
        }
    }

    pub fn register_check(&mut self, check: Box<dyn AxisCheck>) {
        let check: Arc<dyn AxisCheck> = Arc::from(check);
        for kind in check.supported_kinds() {
            self.rules.entry(kind).or_default().checks.push(Arc::clone(&check));
        }
    }

    /// Names of the overrides consulted for `kind`, in order
    pub fn chain(&self, kind: ElementKind) -> Vec<&'static str> {
        self.rules
            .get(&kind)
            .map(|r| r.overrides.iter().map(|o| o.name()).collect())
            .unwrap_or_default()
    }

    pub fn apply(&self, ctx: &OverrideContext<'_>, assignment: Assignment) -> Result<Assignment> {
        let Some(rules) = self.rules.get(&ctx.hint.kind) else {
            return Ok(assignment);
        };

        let mut resolved = assignment;
        for rule in &rules.overrides {
            if let Some(next) = rule.apply(ctx, &assignment)? {
                tracing::trace!(rule = rule.name(), kind = ctx.hint.kind.name(), "override applied");
                resolved = next;
                break;
            }
        }

        for check in &rules.checks {
            check.check(ctx, &resolved)?;
        }
        Ok(resolved)
    }
}

impl Default for OverrideRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();

        registry.register(Box::new(CircularSectionOverride::promoting()));
        registry.register(Box::new(CircularSectionOverride::strict()));
        registry.register(Box::new(NeighborDirectedOverride));
        registry.register(Box::new(VerticalityOverride::horizontal()));
        registry.register(Box::new(VerticalityOverride::vertical()));
        registry.register(Box::new(LongestExtentOverride));

        registry.register_check(Box::new(RoundSectionCheck));
        registry.register_check(Box::new(EndPointCheck));

        registry
    }
}

/// Round sections: keep the round axis as location and widen the other two
/// lines to the section diameter.
pub struct CircularSectionOverride {
    promote_ambiguous: bool,
}

impl CircularSectionOverride {
    /// Pipes: an ambiguous extrusion axis is taken as round
    pub fn promoting() -> Self {
        Self {
            promote_ambiguous: true,
        }
    }

    pub fn strict() -> Self {
        Self {
            promote_ambiguous: false,
        }
    }

    fn promote(&self, assignment: &Assignment) -> Assignment {
        if !self.promote_ambiguous || assignment.location.is_circle() {
            return *assignment;
        }
        let ambiguous = assignment
            .candidates()
            .iter()
            .position(|c| c.circularity == Circularity::Ambiguous && c.is_cylinder);
        match ambiguous {
            Some(index) => {
                let mut promoted = assignment.with_location(index);
                promoted.location = promoted.location.promoted_to_circle();
                promoted
            }
            None => *assignment,
        }
    }
}

impl AxisOverride for CircularSectionOverride {
    fn name(&self) -> &'static str {
        if self.promote_ambiguous {
            "circular_section_promoting"
        } else {
            "circular_section"
        }
    }

    fn apply(&self, ctx: &OverrideContext<'_>, assignment: &Assignment) -> Result<Option<Assignment>> {
        let assignment = self.promote(assignment);
        if !assignment.location.is_circle() || assignment.length.is_circle() || assignment.width.is_circle() {
            return Ok(None);
        }

        let Some(axis) = assignment.location.direction() else {
            return Ok(None);
        };
        let radius = ctx
            .vertices
            .iter()
            .filter_map(|v| distance_to_line(v, &assignment.location.line.start, &axis))
            .fold(0.0_f64, f64::max);
        let diameter = 2.0 * radius;

        let widen = |mut c: DimensionCandidate| {
            if c.length() < diameter {
                c.line = c.line.with_length(diameter);
            }
            c
        };
        Ok(Some(Assignment {
            location: assignment.location,
            length: widen(assignment.length),
            width: widen(assignment.width),
        }))
    }

    fn supported_kinds(&self) -> Vec<ElementKind> {
        if self.promote_ambiguous {
            vec![ElementKind::Pipe]
        } else {
            ElementKind::ALL
                .iter()
                .copied()
                .filter(|k| *k != ElementKind::Pipe)
                .collect()
        }
    }
}

/// Ducts and cable trays: the extrusion axis that points at the connected
/// neighbour is the run direction.
pub struct NeighborDirectedOverride;

impl AxisOverride for NeighborDirectedOverride {
    fn name(&self) -> &'static str {
        "neighbor_directed"
    }

    fn apply(&self, ctx: &OverrideContext<'_>, assignment: &Assignment) -> Result<Option<Assignment>> {
        let Some(neighbor) = ctx.hint.neighbor else {
            return Ok(None);
        };
        let target = neighbor.center();

        let nearest = assignment
            .candidates()
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_cylinder)
            .filter_map(|(i, c)| {
                let dir = c.direction()?;
                distance_to_line(&target, &c.line.start, &dir).map(|d| (i, d))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1));

        Ok(nearest.map(|(index, _)| assignment.with_location(index)))
    }

    fn supported_kinds(&self) -> Vec<ElementKind> {
        vec![ElementKind::Duct, ElementKind::CableTray]
    }
}

/// Beams and walls run horizontally, columns vertically
pub struct VerticalityOverride {
    prefer_vertical: bool,
}

impl VerticalityOverride {
    pub fn horizontal() -> Self {
        Self {
            prefer_vertical: false,
        }
    }

    pub fn vertical() -> Self {
        Self {
            prefer_vertical: true,
        }
    }

    /// Larger is better
    fn score(&self, candidate: &DimensionCandidate) -> Option<f64> {
        let angle = angle_to_vertical(&candidate.direction()?)?;
        Some(if self.prefer_vertical { -angle } else { angle })
    }
}

impl AxisOverride for VerticalityOverride {
    fn name(&self) -> &'static str {
        if self.prefer_vertical {
            "most_vertical"
        } else {
            "most_horizontal"
        }
    }

    fn apply(&self, ctx: &OverrideContext<'_>, assignment: &Assignment) -> Result<Option<Assignment>> {
        let candidates = assignment.candidates();
        let mut best: Option<(usize, f64)> = None;

        for (i, candidate) in candidates.iter().enumerate() {
            let Some(score) = self.score(candidate) else {
                continue;
            };
            best = match best {
                None => Some((i, score)),
                Some((j, best_score)) => {
                    let tie = (score - best_score).abs() <= ctx.tolerances.angular;
                    if (!tie && score > best_score)
                        || (tie && candidate.length() > candidates[j].length())
                    {
                        Some((i, score))
                    } else {
                        Some((j, best_score))
                    }
                }
            };
        }

        Ok(best.map(|(index, _)| assignment.with_location(index)))
    }

    fn supported_kinds(&self) -> Vec<ElementKind> {
        if self.prefer_vertical {
            vec![ElementKind::Column]
        } else {
            vec![ElementKind::Beam, ElementKind::Wall]
        }
    }
}

/// Equipment is placed along its longest extent
pub struct LongestExtentOverride;

impl AxisOverride for LongestExtentOverride {
    fn name(&self) -> &'static str {
        "longest_extent"
    }

    fn apply(&self, _ctx: &OverrideContext<'_>, assignment: &Assignment) -> Result<Option<Assignment>> {
        let longest = assignment
            .candidates()
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.length().total_cmp(&b.1.length()))
            .map(|(i, _)| i);
        Ok(longest.map(|index| assignment.with_location(index)))
    }

    fn supported_kinds(&self) -> Vec<ElementKind> {
        vec![ElementKind::GenericEquipment]
    }
}

/// Ducts and cable trays need a decided cross-section shape
pub struct RoundSectionCheck;

impl AxisCheck for RoundSectionCheck {
    fn name(&self) -> &'static str {
        "round_section"
    }

    fn check(&self, ctx: &OverrideContext<'_>, assignment: &Assignment) -> Result<()> {
        if assignment.location.circularity == Circularity::Ambiguous {
            return Err(Error::AmbiguousCircularity(ctx.hint.kind.name()));
        }
        Ok(())
    }

    fn supported_kinds(&self) -> Vec<ElementKind> {
        vec![ElementKind::Duct, ElementKind::CableTray]
    }
}

/// Flow segments must start and end on their location line
pub struct EndPointCheck;

impl AxisCheck for EndPointCheck {
    fn name(&self) -> &'static str {
        "end_points"
    }

    fn check(&self, ctx: &OverrideContext<'_>, assignment: &Assignment) -> Result<()> {
        validate_end_points(ctx.vertices, &assignment.location.line, ctx.tolerances)
    }

    fn supported_kinds(&self) -> Vec<ElementKind> {
        vec![ElementKind::Pipe, ElementKind::Duct, ElementKind::CableTray]
    }
}
