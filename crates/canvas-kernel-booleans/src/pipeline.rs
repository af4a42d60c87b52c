//! Path boolean pipeline: intersection, splitting, classification, stitching.

use canvas_kernel_path::Path;

use crate::api::BooleanOp;
use crate::classify::{classify_fragments, select_fragments};
use crate::edges::PreparedPath;
use crate::error::Result;
use crate::intersect::find_intersections;
use crate::sew::{assemble_paths, stitch_fragments};
use crate::settings::BooleanSettings;
use crate::split::{split_operand, Fragment, SplitPoint};

/// Paths produced by a boolean operation plus non-fatal warnings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanOutput {
    /// Result paths.
    pub paths: Vec<Path>,
    /// Problems that degraded but did not abort the operation.
    pub warnings: Vec<String>,
}

impl BooleanOutput {
    fn from_paths(paths: Vec<Path>) -> Self {
        Self {
            paths,
            warnings: Vec::new(),
        }
    }
}

/// Result of an operation when the operands are known not to interact.
///
/// `a` and `b` are `None` for operands that enclose nothing. The surviving
/// operands are returned as clones, curves and fill rules intact.
pub(crate) fn passthrough(op: BooleanOp, a: Option<&Path>, b: Option<&Path>) -> Vec<Path> {
    match op {
        BooleanOp::Union | BooleanOp::Exclusion => a.into_iter().chain(b).cloned().collect(),
        BooleanOp::Intersection => Vec::new(),
        BooleanOp::Difference => a.into_iter().cloned().collect(),
    }
}

/// Run a boolean operation through the full pipeline.
pub(crate) fn path_boolean(
    a: &Path,
    b: &Path,
    op: BooleanOp,
    settings: &BooleanSettings,
) -> Result<BooleanOutput> {
    let tol = settings.precision;

    if a.is_empty() || b.is_empty() {
        tracing::debug!(%op, "empty operand shortcut");
        return Ok(BooleanOutput::from_paths(passthrough(
            op,
            (!a.is_empty()).then_some(a),
            (!b.is_empty()).then_some(b),
        )));
    }

    let prepared_a = PreparedPath::new(a, settings)?;
    let prepared_b = PreparedPath::new(b, settings)?;
    if prepared_a.is_empty() || prepared_b.is_empty() {
        tracing::debug!(%op, "operand encloses no area");
        return Ok(BooleanOutput::from_paths(passthrough(
            op,
            (!prepared_a.is_empty()).then_some(a),
            (!prepared_b.is_empty()).then_some(b),
        )));
    }

    let mut box_a = prepared_a.bbox;
    box_a.expand(tol);
    if !box_a.overlaps(&prepared_b.bbox) {
        tracing::debug!(%op, "bounding boxes disjoint");
        return Ok(BooleanOutput::from_paths(passthrough(op, Some(a), Some(b))));
    }

    let intersections = find_intersections(
        &prepared_a.edges,
        &prepared_b.edges,
        tol,
        settings.max_edge_pairs,
    )?;
    tracing::debug!(
        %op,
        edges_a = prepared_a.edges.len(),
        edges_b = prepared_b.edges.len(),
        intersections = intersections.len(),
        "found intersections"
    );

    let (splits_a, splits_b): (Vec<_>, Vec<_>) = intersections
        .iter()
        .map(|ip| {
            (
                SplitPoint {
                    edge: ip.edge_a,
                    t: ip.param_a,
                    point: ip.point,
                },
                SplitPoint {
                    edge: ip.edge_b,
                    t: ip.param_b,
                    point: ip.point,
                },
            )
        })
        .unzip();

    // Without intersections the rings come back whole and are classified
    // as closed contours.
    let fragments_a = split_operand(&prepared_a, &splits_a, tol);
    let fragments_b = split_operand(&prepared_b, &splits_b, tol);

    let classes_a = classify_fragments(&fragments_a, &prepared_b, settings);
    let classes_b = classify_fragments(&fragments_b, &prepared_a, settings);
    let (keep_a, keep_b) = select_fragments(op, &classes_a, &classes_b);
    tracing::debug!(
        %op,
        fragments_a = fragments_a.len(),
        fragments_b = fragments_b.len(),
        kept_a = keep_a.len(),
        kept_b = keep_b.len(),
        "selected fragments"
    );

    let selected: Vec<Fragment> = take_selected(fragments_a, &keep_a)
        .chain(take_selected(fragments_b, &keep_b))
        .collect();

    let stitched = stitch_fragments(selected, tol);
    let (paths, warnings) = assemble_paths(stitched.contours, tol);
    let all_warnings: Vec<String> = prepared_a
        .warnings
        .into_iter()
        .chain(prepared_b.warnings)
        .chain(stitched.warnings)
        .chain(warnings)
        .collect();

    tracing::debug!(%op, paths = paths.len(), warnings = all_warnings.len(), "assembled result");
    Ok(BooleanOutput {
        paths,
        warnings: all_warnings,
    })
}

fn take_selected(
    fragments: Vec<Fragment>,
    keep: &[(usize, bool)],
) -> impl Iterator<Item = Fragment> + '_ {
    let mut slots: Vec<Option<Fragment>> = fragments.into_iter().map(Some).collect();
    keep.iter().filter_map(move |&(i, reverse)| {
        let mut fragment = slots.get_mut(i)?.take()?;
        if reverse {
            fragment.reverse();
        }
        Some(fragment)
    })
}
