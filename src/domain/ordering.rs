//! Ordering of fortnums that share a container or a common ancestor.
//!
//! Two nodes compare by their positions in a container holding both: a shared
//! structural parent, else the earliest-created container listing both.
//! Failing that, they compare by ordering key, the root-to-node path of member
//! positions, provided both hang below the same root and neither is an
//! ancestor of the other.
//! Anything else is [`FortnumError::Incomparable`].

use std::cmp::Ordering;

use tracing::instrument;

use crate::domain::arena::{FortnumArena, FortnumId};
use crate::domain::error::{FortnumError, FortnumResult};

/// Position of every node along the structural path from the root to `id`.
/// Roots have an empty key.
#[instrument(level = "trace", skip(arena))]
pub fn order_key(arena: &FortnumArena, id: FortnumId) -> FortnumResult<Vec<usize>> {
    let mut path = arena.ancestors(id)?;
    path.push(id);
    path.windows(2)
        .map(|pair| {
            position(arena, pair[0], pair[1])?
                .ok_or_else(|| FortnumError::NotFound(arena.name_of(pair[1])))
        })
        .collect()
}

fn position(
    arena: &FortnumArena,
    container: FortnumId,
    member: FortnumId,
) -> FortnumResult<Option<usize>> {
    Ok(arena
        .get(container)?
        .members
        .iter()
        .position(|&m| m == member))
}

fn root_of(arena: &FortnumArena, id: FortnumId) -> FortnumResult<FortnumId> {
    Ok(arena.ancestors(id)?.first().copied().unwrap_or(id))
}

fn incomparable(arena: &FortnumArena, a: FortnumId, b: FortnumId) -> FortnumError {
    FortnumError::Incomparable {
        left: arena.name_of(a),
        right: arena.name_of(b),
    }
}

/// Container deciding the order of `a` and `b`, chosen the same way for both
/// argument orders: a structural parent they share, else the earliest-created
/// container holding both.
fn deciding_container(
    arena: &FortnumArena,
    a: FortnumId,
    b: FortnumId,
) -> FortnumResult<Option<FortnumId>> {
    let (node_a, node_b) = (arena.get(a)?, arena.get(b)?);
    if let (Some(pa), Some(pb)) = (node_a.parent, node_b.parent) {
        if pa == pb {
            return Ok(Some(pa));
        }
    }
    let mut best: Option<(u64, FortnumId)> = None;
    for container in node_a.containers() {
        if position(arena, container, b)?.is_none() {
            continue;
        }
        let seq = arena.get(container)?.seq;
        if best.map_or(true, |(s, _)| seq < s) {
            best = Some((seq, container));
        }
    }
    Ok(best.map(|(_, container)| container))
}

/// Antisymmetric: `try_cmp(a, b)` is the reverse of `try_cmp(b, a)`.
#[instrument(level = "trace", skip(arena))]
pub fn try_cmp(arena: &FortnumArena, a: FortnumId, b: FortnumId) -> FortnumResult<Ordering> {
    if a == b {
        return Ok(Ordering::Equal);
    }
    if let Some(container) = deciding_container(arena, a, b)? {
        if let (Some(pa), Some(pb)) = (
            position(arena, container, a)?,
            position(arena, container, b)?,
        ) {
            return Ok(pa.cmp(&pb));
        }
    }

    if root_of(arena, a)? != root_of(arena, b)? {
        return Err(incomparable(arena, a, b));
    }
    let key_a = order_key(arena, a)?;
    let key_b = order_key(arena, b)?;
    if key_a.starts_with(&key_b) || key_b.starts_with(&key_a) {
        return Err(incomparable(arena, a, b));
    }
    Ok(key_a.cmp(&key_b))
}

/// Stable sort; fails on the first incomparable pair.
pub fn sorted<I>(arena: &FortnumArena, ids: I) -> FortnumResult<Vec<FortnumId>>
where
    I: IntoIterator<Item = FortnumId>,
{
    let mut result: Vec<FortnumId> = Vec::new();
    for id in ids {
        let mut at = result.len();
        while at > 0 && try_cmp(arena, result[at - 1], id)? == Ordering::Greater {
            at -= 1;
        }
        result.insert(at, id);
    }
    Ok(result)
}

/// Greatest node; the first one wins on ties.
pub fn max<I>(arena: &FortnumArena, ids: I) -> FortnumResult<Option<FortnumId>>
where
    I: IntoIterator<Item = FortnumId>,
{
    pick(arena, ids, Ordering::Greater)
}

/// Smallest node; the first one wins on ties.
pub fn min<I>(arena: &FortnumArena, ids: I) -> FortnumResult<Option<FortnumId>>
where
    I: IntoIterator<Item = FortnumId>,
{
    pick(arena, ids, Ordering::Less)
}

fn pick<I>(arena: &FortnumArena, ids: I, wanted: Ordering) -> FortnumResult<Option<FortnumId>>
where
    I: IntoIterator<Item = FortnumId>,
{
    let mut best: Option<FortnumId> = None;
    for id in ids {
        best = match best {
            Some(current) if try_cmp(arena, id, current)? != wanted => Some(current),
            _ => Some(id),
        };
    }
    Ok(best)
}
