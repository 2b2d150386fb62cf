//! Gallery items and the doubled sequence the tiles are built from.

use ahash::AHashMap;

/// One image and its caption.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GalleryItem {
    /// Path of the image file.
    pub image: String,
    pub text: String,
}

impl GalleryItem {
    pub fn new(image: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            image: image.into(),
            text: text.into(),
        }
    }
}

const DEFAULT_PROJECTS: &[(&str, &str)] = &[
    ("assets/projects/skyline-residences.jpg", "Skyline Residences"),
    ("assets/projects/harbour-view.jpg", "Harbour View"),
    ("assets/projects/green-acres.jpg", "Green Acres"),
    ("assets/projects/the-meridian.jpg", "The Meridian"),
    ("assets/projects/lakeside-villas.jpg", "Lakeside Villas"),
    ("assets/projects/palm-grove.jpg", "Palm Grove"),
    ("assets/projects/urban-nest.jpg", "Urban Nest"),
    ("assets/projects/crest-towers.jpg", "Crest Towers"),
    ("assets/projects/maple-court.jpg", "Maple Court"),
    ("assets/projects/sunrise-heights.jpg", "Sunrise Heights"),
];

/// The built-in project list shown when no items are configured.
pub fn default_items() -> Vec<GalleryItem> {
    DEFAULT_PROJECTS
        .iter()
        .map(|(image, text)| GalleryItem::new(*image, *text))
        .collect()
}

/// Builds the internal tile sequence: the items followed by a second copy of themselves.
///
/// When the items can be ordered so that no two neighbours (including the last and the
/// first) share an image, they are reordered that way before doubling, which leaves both
/// the middle join and the outer wrap free of duplicates. Otherwise only those two seams of
/// the doubled sequence are repaired, and a seam that is already clean is left alone.
///
/// ```
/// use circular_gallery::{arrange_sequence, GalleryItem};
///
/// let items = vec![
///     GalleryItem::new("a.jpg", "A"),
///     GalleryItem::new("b.jpg", "B"),
///     GalleryItem::new("a.jpg", "A2"),
/// ];
/// let sequence = arrange_sequence(&items);
///
/// assert_eq!(sequence.len(), 6);
/// assert_ne!(sequence[2].image, sequence[3].image);
/// ```
pub fn arrange_sequence(items: &[GalleryItem]) -> Vec<GalleryItem> {
    let mut base = items.to_vec();

    if base.len() > 1 && can_arrange_cyclically(&base) {
        if !repair_cyclic(&mut base) {
            base = interleave_by_frequency(&base);
        }
        return doubled(base);
    }

    let mut sequence = doubled(base);
    repair_seams(&mut sequence);
    sequence
}

/// Number of neighbouring pairs sharing an image, counting the wrap from last to first.
pub fn cyclic_conflicts(sequence: &[GalleryItem]) -> usize {
    let len = sequence.len();
    if len < 2 {
        return 0;
    }
    (0..len)
        .filter(|&i| sequence[i].image == sequence[(i + 1) % len].image)
        .count()
}

fn doubled(mut base: Vec<GalleryItem>) -> Vec<GalleryItem> {
    base.extend_from_within(..);
    base
}

fn image_counts(items: &[GalleryItem]) -> AHashMap<&str, usize> {
    let mut counts = AHashMap::new();
    for item in items {
        *counts.entry(item.image.as_str()).or_insert(0) += 1;
    }
    counts
}

fn can_arrange_cyclically(items: &[GalleryItem]) -> bool {
    let most_frequent = image_counts(items).values().copied().max().unwrap_or(0);
    most_frequent <= items.len() / 2
}

/// Swaps the second element of each conflicting pair with some other element whenever that
/// strictly lowers the conflict count. Returns whether the list ended up conflict-free.
fn repair_cyclic(items: &mut [GalleryItem]) -> bool {
    let len = items.len();
    let mut conflicts = cyclic_conflicts(items);

    for _ in 0..len {
        if conflicts == 0 {
            return true;
        }
        let mut improved = false;

        for i in 0..len {
            let next = (i + 1) % len;
            if items[i].image != items[next].image {
                continue;
            }
            for offset in 1..len {
                let candidate = (next + offset) % len;
                if candidate == i || items[candidate].image == items[next].image {
                    continue;
                }
                items.swap(next, candidate);
                let after = cyclic_conflicts(items);
                if after < conflicts {
                    conflicts = after;
                    improved = true;
                    break;
                }
                items.swap(next, candidate);
            }
        }

        if !improved {
            break;
        }
    }

    conflicts == 0
}

/// Orders items by how often their image occurs, then deals them into the even slots
/// followed by the odd ones.
fn interleave_by_frequency(items: &[GalleryItem]) -> Vec<GalleryItem> {
    let counts = image_counts(items);
    let mut first_seen: AHashMap<&str, usize> = AHashMap::new();
    for (position, item) in items.iter().enumerate() {
        first_seen.entry(item.image.as_str()).or_insert(position);
    }

    let mut ordered: Vec<&GalleryItem> = items.iter().collect();
    ordered.sort_by(|a, b| {
        let a_key = (counts[a.image.as_str()], first_seen[a.image.as_str()]);
        let b_key = (counts[b.image.as_str()], first_seen[b.image.as_str()]);
        b_key.0.cmp(&a_key.0).then(a_key.1.cmp(&b_key.1))
    });

    let slots = (0..items.len()).step_by(2).chain((1..items.len()).step_by(2));
    let mut arranged: Vec<Option<GalleryItem>> = vec![None; items.len()];
    for (slot, item) in slots.zip(ordered) {
        arranged[slot] = Some(item.clone());
    }
    arranged.into_iter().flatten().collect()
}

/// Cleans the two seams of a doubled sequence that cannot be made conflict-free: the join
/// between the halves and the wrap from the last entry to the first. At a dirty seam the
/// entry on its right is swapped with the nearest following entry showing another image, and
/// the swap is kept only if the seam comes out clean, the other seam is not dirtied and the
/// overall conflict count does not grow.
fn repair_seams(sequence: &mut [GalleryItem]) {
    let len = sequence.len();
    let half = len / 2;
    if half == 0 {
        return;
    }
    let join = (half - 1, half);
    let wrap = (len - 1, 0);

    for (seam, other) in [(join, wrap), (wrap, join)] {
        let (left, right) = seam;
        if sequence[left].image != sequence[right].image {
            continue;
        }

        let conflicts = cyclic_conflicts(sequence);
        let other_was_clean = is_clean(sequence, other);
        for offset in 1..len {
            let candidate = (right + offset) % len;
            if candidate == left || sequence[candidate].image == sequence[right].image {
                continue;
            }
            sequence.swap(right, candidate);
            let keeps = is_clean(sequence, seam)
                && (!other_was_clean || is_clean(sequence, other))
                && cyclic_conflicts(sequence) <= conflicts;
            if keeps {
                break;
            }
            sequence.swap(right, candidate);
        }
    }
}

fn is_clean(sequence: &[GalleryItem], (left, right): (usize, usize)) -> bool {
    sequence[left].image != sequence[right].image
}
