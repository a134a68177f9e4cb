//! Tick addressable view over per connection data
use std::ops::Index;

/// Maps a tick to an index within its data block,
/// None when that tick is missing.
pub type TickLookup<'a> = Box<dyn Fn(u32) -> Option<usize> + 'a>;

/// [SparseList] represents data we may be missing a lot of:
/// one data block per tick range, without storing anything
/// in between. Ranges should not overlap: the first range
/// containing a tick wins, whatever order they were given in.
pub struct SparseList<'a, T> {
    ranges: Vec<(u32, u32)>,
    data: Vec<Vec<T>>,
    tick_lookup: Vec<TickLookup<'a>>,
    default: T,
    max: Option<u32>,
}

impl<'a, T> SparseList<'a, T> {
    /// Builds a new [SparseList] from parallel inclusive tick ranges, data blocks
    /// and tick lookup methods. `default` is returned for any tick we have no data for.
    pub fn new(
        ranges: Vec<(u32, u32)>,
        data: Vec<Vec<T>>,
        tick_lookup: Vec<TickLookup<'a>>,
        default: T,
    ) -> Self {
        debug_assert_eq!(ranges.len(), data.len());
        debug_assert_eq!(ranges.len(), tick_lookup.len());
        let max = ranges.iter().map(|(_, end)| *end).max();
        Self {
            ranges,
            data,
            tick_lookup,
            default,
            max,
        }
    }

    /// Number of ticks that may be fetched: last tick covered + 1.
    pub fn len(&self) -> usize {
        self.max.map(|max| max as usize + 1).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at this tick, or the default value if we have no data for it.
    pub fn get(&self, tick: u32) -> &T {
        self.ranges
            .iter()
            .zip(self.data.iter())
            .zip(self.tick_lookup.iter())
            .find(|(((start, end), _), _)| *start <= tick && tick <= *end)
            .and_then(|((_, datum), lookup)| datum.get(lookup(tick)?))
            .unwrap_or(&self.default)
    }

    /// Iterates over all ticks in 0..[Self::len]
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        (0..self.len() as u32).map(|tick| self.get(tick))
    }
}

impl<T> Index<u32> for SparseList<'_, T> {
    type Output = T;
    fn index(&self, tick: u32) -> &T {
        self.get(tick)
    }
}
