use alloc::boxed::Box;
use alloc::collections::VecDeque;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ptr::NonNull;

/// Number of buckets used when the bucket count is not spelled out.
pub const DEFAULT_BUCKET_COUNT: usize = 10_000;

/// Position of an entry: a slot in the occupancy index plus an offset into
/// that bucket's chain.
///
/// A cursor held by an iterator always names a live entry. The exhausted
/// state is represented by the absence of a cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Cursor {
    slot: usize,
    offset: usize,
}

/// Debug statistics for a [`HashTable`].
///
/// Available with the `stats` feature or under `cfg(test)`.
#[cfg(any(test, feature = "stats"))]
#[derive(Debug, Clone)]
pub struct DebugStats {
    /// Number of elements currently in the table
    pub populated: usize,
    /// Fixed number of buckets
    pub bucket_count: usize,
    /// Number of buckets holding at least one element
    pub occupied_buckets: usize,
    /// Length of the longest chain
    pub longest_chain: usize,
    /// Load factor (populated / bucket_count)
    pub load_factor: f64,
    /// Bucket utilization (occupied_buckets / bucket_count)
    pub bucket_utilization: f64,
    /// Mean chain length over occupied buckets
    pub mean_chain_length: f64,
}

#[cfg(any(test, feature = "stats"))]
impl DebugStats {
    /// Pretty-print the debug statistics.
    #[cfg(feature = "std")]
    pub fn print(&self) {
        println!("=== Hash Table Debug Statistics ===");
        println!(
            "Population: {} over {} buckets ({:.2}% load factor)",
            self.populated,
            self.bucket_count,
            self.load_factor * 100.0
        );
        println!(
            "Bucket Usage: {}/{} ({:.2}% utilization)",
            self.occupied_buckets,
            self.bucket_count,
            self.bucket_utilization * 100.0
        );
        println!(
            "Chains: longest {}, mean {:.02}",
            self.longest_chain, self.mean_chain_length
        );
    }
}

/// A hash table with a fixed number of buckets, each holding a chain of
/// colliding values.
///
/// `HashTable<V, N>` never resizes: a value with hash `h` always lives in
/// bucket `h % N`. Like other raw tables, it requires you to provide both the
/// hash value and an equality predicate for each operation.
///
/// Alongside the chains, the table keeps an index of the buckets that are
/// currently non-empty, so iteration and [`clear`] cost time proportional to
/// the occupied buckets rather than to `N`. Each bucket also records its slot
/// in that index, which makes unregistering an emptied bucket O(1).
///
/// ## Ordering
///
/// Iteration visits buckets in the order in which they became non-empty, and
/// within a bucket the most recently inserted value first. Removing the last
/// value of a bucket moves the most recently registered bucket into the freed
/// slot, so the order is not stable across removals.
///
/// ## Example
///
/// ```rust
/// # use core::hash::Hash;
/// # use core::hash::Hasher;
/// #
/// # use chain_hash::hash_table::HashTable;
/// # use siphasher::sip::SipHasher;
/// #
/// # fn hash_u64(n: u64) -> u64 {
/// #     let mut hasher = SipHasher::new();
/// #     n.hash(&mut hasher);
/// #     hasher.finish()
/// # }
/// #
/// let mut table: HashTable<(u64, &str), 64> = HashTable::new();
/// table
///     .entry(hash_u64(7), |&(k, _)| k == 7)
///     .or_insert((7, "seven"));
///
/// assert_eq!(table.find(hash_u64(7), |&(k, _)| k == 7), Some(&(7, "seven")));
/// assert_eq!(table.len(), 1);
/// assert_eq!(table.occupied_buckets(), 1);
/// ```
///
/// [`clear`]: HashTable::clear
#[derive(Clone)]
pub struct HashTable<V, const N: usize = DEFAULT_BUCKET_COUNT> {
    chains: Box<[VecDeque<V>]>,
    /// Buckets with a non-empty chain, in registration order.
    occupied: Vec<usize>,
    /// Slot of each bucket in `occupied`. Only meaningful for occupied buckets.
    positions: Box<[usize]>,
    populated: usize,
}

impl<V, const N: usize> Debug for HashTable<V, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if self.is_empty() {
            return f
                .debug_struct("HashTable")
                .field("chains", &"empty")
                .field("populated", &self.populated)
                .field("buckets", &N)
                .finish();
        }

        f.debug_struct("HashTable")
            .field(
                "chains",
                &self
                    .occupied
                    .iter()
                    .map(|&bucket| (bucket, self.chains[bucket].len()))
                    .collect::<Vec<_>>(),
            )
            .field("populated", &self.populated)
            .field("buckets", &N)
            .finish()
    }
}

impl<V, const N: usize> Default for HashTable<V, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, const N: usize> HashTable<V, N> {
    /// Creates an empty table with `N` buckets.
    ///
    /// All `N` (empty) chains are set up here; no later operation allocates
    /// bucket storage.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let table: HashTable<String, 128> = HashTable::new();
    /// assert!(table.is_empty());
    /// assert_eq!(table.bucket_count(), 128);
    /// ```
    pub fn new() -> Self {
        const { assert!(N > 0, "a HashTable needs at least one bucket") };

        Self {
            chains: (0..N).map(|_| VecDeque::new()).collect(),
            occupied: Vec::new(),
            positions: alloc::vec![0; N].into_boxed_slice(),
            populated: 0,
        }
    }

    #[inline(always)]
    fn bucket_index(hash: u64) -> usize {
        (hash % N as u64) as usize
    }

    /// Returns the number of elements in the table.
    pub fn len(&self) -> usize {
        self.populated
    }

    /// Returns `true` if the table contains no elements.
    pub fn is_empty(&self) -> bool {
        self.populated == 0
    }

    /// Returns the fixed number of buckets, `N`.
    pub fn bucket_count(&self) -> usize {
        N
    }

    /// Returns the number of buckets that currently hold at least one value.
    pub fn occupied_buckets(&self) -> usize {
        self.occupied.len()
    }

    /// Appends `bucket` to the occupancy index. Must be called while the
    /// bucket's chain is still empty.
    fn register_bucket(&mut self, bucket: usize) {
        debug_assert!(self.chains[bucket].is_empty());
        self.positions[bucket] = self.occupied.len();
        self.occupied.push(bucket);
    }

    /// Drops `bucket` from the occupancy index once its chain has emptied.
    ///
    /// The last registered bucket takes over the freed slot.
    fn release_bucket(&mut self, bucket: usize) {
        debug_assert!(self.chains[bucket].is_empty());
        let slot = self.positions[bucket];
        debug_assert_eq!(self.occupied[slot], bucket);

        self.occupied.swap_remove(slot);
        if let Some(&moved) = self.occupied.get(slot) {
            self.positions[moved] = slot;
        }
        self.positions[bucket] = 0;
    }

    fn locate(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<(usize, usize)> {
        let bucket = Self::bucket_index(hash);
        self.chains[bucket]
            .iter()
            .position(eq)
            .map(|offset| (bucket, offset))
    }

    fn take(&mut self, bucket: usize, offset: usize) -> Option<V> {
        let value = self.chains[bucket].remove(offset)?;
        self.populated -= 1;
        if self.chains[bucket].is_empty() {
            self.release_bucket(bucket);
        }
        Some(value)
    }

    /// Removes and returns an arbitrary value, keeping every index consistent.
    fn pop_any(&mut self) -> Option<V> {
        let &bucket = self.occupied.last()?;
        self.take(bucket, 0)
    }

    fn first_cursor(&self) -> Option<Cursor> {
        (!self.occupied.is_empty()).then_some(Cursor { slot: 0, offset: 0 })
    }

    fn advance(&self, cursor: Cursor) -> Option<Cursor> {
        let chain = &self.chains[self.occupied[cursor.slot]];
        if cursor.offset + 1 < chain.len() {
            return Some(Cursor {
                slot: cursor.slot,
                offset: cursor.offset + 1,
            });
        }

        let slot = cursor.slot + 1;
        (slot < self.occupied.len()).then_some(Cursor { slot, offset: 0 })
    }

    fn cursor_of(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<Cursor> {
        let (bucket, offset) = self.locate(hash, eq)?;
        Some(Cursor {
            slot: self.positions[bucket],
            offset,
        })
    }

    /// Returns an iterator over all values in the table.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64, 16> = HashTable::new();
    /// table.entry(3, |&v| v == 3).or_insert(3);
    /// table.entry(19, |&v| v == 19).or_insert(19);
    /// table.entry(4, |&v| v == 4).or_insert(4);
    ///
    /// // 3 and 19 share bucket 3; the newest value comes first.
    /// let values: Vec<u64> = table.iter().copied().collect();
    /// assert_eq!(values, vec![19, 3, 4]);
    /// ```
    pub fn iter(&self) -> Iter<'_, V, N> {
        Iter {
            table: self,
            cursor: self.first_cursor(),
        }
    }

    /// Returns an iterator over mutable references to all values in the
    /// table.
    pub fn iter_mut(&mut self) -> IterMut<'_, V, N> {
        let cursor = self.first_cursor();
        IterMut {
            table: NonNull::from(self),
            cursor,
            _marker: PhantomData,
        }
    }

    /// Returns an iterator positioned at the value matching `eq`, or an
    /// exhausted iterator if there is none.
    ///
    /// Advancing the returned iterator continues through the rest of the
    /// table in iteration order.
    pub fn find_iter(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Iter<'_, V, N> {
        Iter {
            table: self,
            cursor: self.cursor_of(hash, eq),
        }
    }

    /// Mutable counterpart of [`find_iter`](HashTable::find_iter).
    pub fn find_iter_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> IterMut<'_, V, N> {
        let cursor = self.cursor_of(hash, eq);
        IterMut {
            table: NonNull::from(self),
            cursor,
            _marker: PhantomData,
        }
    }

    /// Returns the exhausted iterator.
    pub fn end(&self) -> Iter<'_, V, N> {
        Iter {
            table: self,
            cursor: None,
        }
    }

    /// Returns the exhausted mutable iterator.
    pub fn end_mut(&mut self) -> IterMut<'_, V, N> {
        IterMut {
            table: NonNull::from(self),
            cursor: None,
            _marker: PhantomData,
        }
    }

    /// Returns an iterator that removes and yields all values from the table.
    ///
    /// After calling `drain()`, the table will be empty, even if the iterator
    /// is dropped before it is exhausted.
    pub fn drain(&mut self) -> Drain<'_, V, N> {
        Drain { table: self }
    }

    /// Removes all values from the table.
    ///
    /// Only the occupied buckets are visited; the bucket storage itself is
    /// kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64, 16> = HashTable::new();
    /// table.entry(1, |&v| v == 1).or_insert(1);
    /// table.entry(2, |&v| v == 2).or_insert(2);
    /// assert_eq!(table.len(), 2);
    ///
    /// table.clear();
    /// assert!(table.is_empty());
    /// assert_eq!(table.occupied_buckets(), 0);
    /// assert_eq!(table.iter().count(), 0);
    /// ```
    pub fn clear(&mut self) {
        for bucket in self.occupied.drain(..) {
            self.chains[bucket].clear();
            self.positions[bucket] = 0;
        }
        self.populated = 0;
    }

    /// Keeps only the values for which `keep` returns `true`.
    ///
    /// Buckets left empty are unregistered as they are found.
    pub fn retain(&mut self, mut keep: impl FnMut(&mut V) -> bool) {
        let mut slot = 0;
        while slot < self.occupied.len() {
            let bucket = self.occupied[slot];
            let chain = &mut self.chains[bucket];
            let before = chain.len();
            chain.retain_mut(&mut keep);
            self.populated -= before - chain.len();

            if chain.is_empty() {
                // The last slot's bucket moves here; visit it next.
                self.release_bucket(bucket);
            } else {
                slot += 1;
            }
        }
    }

    /// Removes the value matching `eq` from the table and returns it.
    ///
    /// Returns `None` if no value matches; the table is left untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<u64, 16> = HashTable::new();
    /// table.entry(5, |&v| v == 5).or_insert(5);
    ///
    /// assert_eq!(table.remove(5, |&v| v == 5), Some(5));
    /// assert_eq!(table.remove(5, |&v| v == 5), None);
    /// assert_eq!(table.occupied_buckets(), 0);
    /// ```
    pub fn remove(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<V> {
        let (bucket, offset) = self.locate(hash, eq)?;
        self.take(bucket, offset)
    }

    /// Gets the entry for `hash`/`eq` for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use chain_hash::hash_table::Entry;
    /// # use chain_hash::hash_table::HashTable;
    /// #
    /// let mut table: HashTable<(u64, u32), 16> = HashTable::new();
    ///
    /// match table.entry(9, |&(k, _)| k == 9) {
    ///     Entry::Vacant(entry) => {
    ///         entry.insert((9, 1));
    ///     }
    ///     Entry::Occupied(_) => unreachable!(),
    /// }
    ///
    /// match table.entry(9, |&(k, _)| k == 9) {
    ///     Entry::Occupied(mut entry) => entry.get_mut().1 += 1,
    ///     Entry::Vacant(_) => unreachable!(),
    /// }
    ///
    /// assert_eq!(table.find(9, |&(k, _)| k == 9), Some(&(9, 2)));
    /// ```
    pub fn entry(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Entry<'_, V, N> {
        let bucket = Self::bucket_index(hash);
        match self.chains[bucket].iter().position(eq) {
            Some(offset) => Entry::Occupied(OccupiedEntry {
                table: self,
                bucket,
                offset,
            }),
            None => Entry::Vacant(VacantEntry {
                table: self,
                bucket,
            }),
        }
    }

    /// Returns a reference to the value matching `eq`, if present.
    pub fn find(&self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&V> {
        let (bucket, offset) = self.locate(hash, eq)?;
        self.chains[bucket].get(offset)
    }

    /// Returns a mutable reference to the value matching `eq`, if present.
    pub fn find_mut(&mut self, hash: u64, eq: impl Fn(&V) -> bool) -> Option<&mut V> {
        let (bucket, offset) = self.locate(hash, eq)?;
        self.chains[bucket].get_mut(offset)
    }

    /// Computes a histogram of chain lengths.
    ///
    /// Index `i` of the result holds the number of buckets whose chain has
    /// exactly `i` values, so index 0 counts the empty buckets. The result
    /// has `longest_chain + 1` bins.
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_histogram(&self) -> Vec<usize> {
        let longest = self
            .occupied
            .iter()
            .map(|&bucket| self.chains[bucket].len())
            .max()
            .unwrap_or(0);

        let mut hist = alloc::vec![0usize; longest + 1];
        hist[0] = N - self.occupied.len();
        for &bucket in &self.occupied {
            hist[self.chains[bucket].len()] += 1;
        }
        hist
    }

    /// Returns utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        let occupied_buckets = self.occupied.len();
        let longest_chain = self
            .occupied
            .iter()
            .map(|&bucket| self.chains[bucket].len())
            .max()
            .unwrap_or(0);

        DebugStats {
            populated: self.populated,
            bucket_count: N,
            occupied_buckets,
            longest_chain,
            load_factor: self.populated as f64 / N as f64,
            bucket_utilization: occupied_buckets as f64 / N as f64,
            mean_chain_length: if occupied_buckets == 0 {
                0.0
            } else {
                self.populated as f64 / occupied_buckets as f64
            },
        }
    }

    /// Pretty-prints the chain-length histogram horizontally using stdout.
    ///
    /// Requires the `std` feature. The empty-bucket bin is left out since it
    /// usually dwarfs the rest.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_chain_histogram(&self) {
        let hist = self.chain_histogram();
        let max = hist.iter().skip(1).copied().max().unwrap_or(0);
        if max == 0 {
            println!("chain histogram: empty");
            return;
        }

        let max_bar = 60usize;
        println!(
            "chain histogram ({} entries, {} empty buckets):",
            self.populated, hist[0]
        );
        for (len, &count) in hist.iter().enumerate().skip(1) {
            let width = (count * max_bar).div_ceil(max);
            println!("{:>3} | {} ({})", len, "█".repeat(width), count);
        }
    }

    /// Panics unless every structural invariant holds.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let mut total = 0;
        let mut seen = alloc::vec![false; N];
        for (slot, &bucket) in self.occupied.iter().enumerate() {
            assert!(bucket < N, "bucket {bucket} out of range");
            assert!(!seen[bucket], "bucket {bucket} registered twice");
            seen[bucket] = true;
            assert_eq!(self.positions[bucket], slot, "stale slot for {bucket}");
            assert!(!self.chains[bucket].is_empty(), "empty bucket {bucket} registered");
        }
        for (bucket, chain) in self.chains.iter().enumerate() {
            total += chain.len();
            assert_eq!(
                !chain.is_empty(),
                seen[bucket],
                "occupancy mismatch for bucket {bucket}"
            );
        }
        assert_eq!(total, self.populated);
    }
}

/// A view into a single entry in the hash table, which may be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashTable`].
///
/// [`entry`]: HashTable::entry
pub enum Entry<'a, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    /// A vacant entry - no matching value is present in the table
    Vacant(VacantEntry<'a, V, N>),
    /// An occupied entry - a matching value is present in the table
    Occupied(OccupiedEntry<'a, V, N>),
}

impl<'a, V, const N: usize> Entry<'a, V, N> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Vacant(entry) => entry.insert(default),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Inserts the result of `default` if the entry is vacant and returns a
    /// mutable reference to the value in the entry.
    pub fn or_insert_with(self, default: impl FnOnce() -> V) -> &'a mut V {
        match self {
            Entry::Vacant(entry) => entry.insert(default()),
            Entry::Occupied(entry) => entry.into_mut(),
        }
    }

    /// Applies `f` to an occupied entry's value and hands the entry back.
    pub fn and_modify(self, f: impl FnOnce(&mut V)) -> Self {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Inserts `V::default()` if the entry is vacant and returns a mutable
    /// reference to the value in the entry.
    pub fn or_default(self) -> &'a mut V
    where
        V: Default,
    {
        self.or_insert_with(V::default)
    }
}

/// A view into a vacant entry in a [`HashTable`].
pub struct VacantEntry<'a, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    table: &'a mut HashTable<V, N>,
    bucket: usize,
}

impl<'a, V, const N: usize> VacantEntry<'a, V, N> {
    /// Inserts `value` at the head of its bucket's chain and returns a
    /// mutable reference to it.
    ///
    /// A bucket that was empty is registered in the occupancy index first.
    pub fn insert(self, value: V) -> &'a mut V {
        let table = self.table;
        if table.chains[self.bucket].is_empty() {
            table.register_bucket(self.bucket);
        }
        table.chains[self.bucket].push_front(value);
        table.populated += 1;
        &mut table.chains[self.bucket][0]
    }
}

/// A view into an occupied entry in a [`HashTable`].
pub struct OccupiedEntry<'a, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    table: &'a mut HashTable<V, N>,
    bucket: usize,
    offset: usize,
}

impl<'a, V, const N: usize> OccupiedEntry<'a, V, N> {
    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.table.chains[self.bucket][self.offset]
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.table.chains[self.bucket][self.offset]
    }

    /// Converts the entry into a mutable reference bound to the table's
    /// lifetime.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.table.chains[self.bucket][self.offset]
    }

    /// Removes the value from the table and returns it.
    pub fn remove(self) -> V {
        match self.table.take(self.bucket, self.offset) {
            Some(value) => value,
            None => unreachable!("occupied entry points at a missing value"),
        }
    }
}

/// An iterator over the values in a [`HashTable`].
///
/// Created by [`HashTable::iter`] (positioned at the first value),
/// [`HashTable::find_iter`] (positioned at a found value) and
/// [`HashTable::end`] (exhausted). Two iterators compare equal when they sit
/// at the same position, and every exhausted iterator equals
/// [`HashTable::end`].
pub struct Iter<'a, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    table: &'a HashTable<V, N>,
    cursor: Option<Cursor>,
}

impl<'a, V, const N: usize> Iter<'a, V, N> {
    /// Returns the value at the current position without advancing.
    pub fn get(&self) -> Option<&'a V> {
        let cursor = self.cursor?;
        let bucket = self.table.occupied[cursor.slot];
        self.table.chains[bucket].get(cursor.offset)
    }

    /// Returns `true` once the iterator has run past the last value.
    pub fn is_end(&self) -> bool {
        self.cursor.is_none()
    }
}

impl<V, const N: usize> Clone for Iter<'_, V, N> {
    fn clone(&self) -> Self {
        Self {
            table: self.table,
            cursor: self.cursor,
        }
    }
}

impl<V, const N: usize> PartialEq for Iter<'_, V, N> {
    fn eq(&self, other: &Self) -> bool {
        self.cursor == other.cursor
    }
}

impl<V, const N: usize> Eq for Iter<'_, V, N> {}

impl<'a, V, const N: usize> Iterator for Iter<'a, V, N> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor?;
        let value = self.get();
        self.cursor = self.table.advance(cursor);
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.cursor {
            Some(_) => (1, Some(self.table.populated)),
            None => (0, Some(0)),
        }
    }
}

impl<V, const N: usize> FusedIterator for Iter<'_, V, N> {}

impl<'a, V, const N: usize> From<IterMut<'a, V, N>> for Iter<'a, V, N> {
    fn from(iter: IterMut<'a, V, N>) -> Self {
        Self {
            // SAFETY: `iter` exclusively borrowed the table for `'a` and is
            // consumed here, so downgrading to a shared borrow for `'a` is
            // sound. Values already yielded as `&mut` sit before the cursor and
            // are never reached again by a forward-only iterator.
            table: unsafe { iter.table.as_ref() },
            cursor: iter.cursor,
        }
    }
}

/// A mutable iterator over the values in a [`HashTable`].
///
/// Created by [`HashTable::iter_mut`], [`HashTable::find_iter_mut`] and
/// [`HashTable::end_mut`].
pub struct IterMut<'a, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    table: NonNull<HashTable<V, N>>,
    cursor: Option<Cursor>,
    _marker: PhantomData<&'a mut HashTable<V, N>>,
}

impl<'a, V, const N: usize> IterMut<'a, V, N> {
    /// Returns `true` once the iterator has run past the last value.
    pub fn is_end(&self) -> bool {
        self.cursor.is_none()
    }

    /// Returns the value at the current position without advancing.
    pub fn get(&self) -> Option<&V> {
        let cursor = self.cursor?;
        // SAFETY: The table outlives `'a` and is only reached through this
        // iterator. The shared borrow is tied to `&self`, so no `&mut` to the
        // current value can be produced while it lives.
        let table = unsafe { self.table.as_ref() };
        table.chains[table.occupied[cursor.slot]].get(cursor.offset)
    }

    /// Returns the value at the current position mutably without advancing.
    pub fn get_mut(&mut self) -> Option<&mut V> {
        self.current()
    }

    fn current<'b>(&mut self) -> Option<&'b mut V> {
        let cursor = self.cursor?;
        // SAFETY: The iterator was built from a `&'a mut HashTable`, so the
        // table is alive and not otherwise reachable for `'a`. The cursor names
        // a live value, and only the bucket headers are touched here, never
        // values previously handed out. Callers bound `'b` either to `&mut
        // self` or, in `next`, advance past the position so that each value is
        // yielded at most once.
        unsafe {
            let table = &mut *self.table.as_ptr();
            let bucket = table.occupied[cursor.slot];
            table.chains[bucket].get_mut(cursor.offset)
        }
    }
}

impl<V, const N: usize> PartialEq for IterMut<'_, V, N> {
    fn eq(&self, other: &Self) -> bool {
        self.cursor == other.cursor
    }
}

impl<V, const N: usize> Eq for IterMut<'_, V, N> {}

impl<'a, V, const N: usize> Iterator for IterMut<'a, V, N> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        let cursor = self.cursor?;
        let value: Option<&'a mut V> = self.current();
        // SAFETY: Only the occupancy index and chain lengths are read, which
        // never overlap the values handed out.
        self.cursor = unsafe { self.table.as_ref() }.advance(cursor);
        value
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.cursor {
            // SAFETY: Reads the element count only.
            Some(_) => (1, Some(unsafe { self.table.as_ref() }.populated)),
            None => (0, Some(0)),
        }
    }
}

impl<V, const N: usize> FusedIterator for IterMut<'_, V, N> {}

/// A draining iterator over the values in a [`HashTable`].
///
/// This struct is created by the [`drain`] method on [`HashTable`].
///
/// [`drain`]: HashTable::drain
pub struct Drain<'a, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    table: &'a mut HashTable<V, N>,
}

impl<V, const N: usize> Drop for Drain<'_, V, N> {
    fn drop(&mut self) {
        for _ in &mut *self {}
    }
}

impl<V, const N: usize> Iterator for Drain<'_, V, N> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.table.pop_any()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V, const N: usize> ExactSizeIterator for Drain<'_, V, N> {}

impl<V, const N: usize> FusedIterator for Drain<'_, V, N> {}

/// An owning iterator over the values of a [`HashTable`].
pub struct IntoIter<V, const N: usize = DEFAULT_BUCKET_COUNT> {
    table: HashTable<V, N>,
}

impl<V, const N: usize> Iterator for IntoIter<V, N> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        self.table.pop_any()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.table.populated, Some(self.table.populated))
    }
}

impl<V, const N: usize> ExactSizeIterator for IntoIter<V, N> {}

impl<V, const N: usize> FusedIterator for IntoIter<V, N> {}

impl<V, const N: usize> IntoIterator for HashTable<V, N> {
    type Item = V;
    type IntoIter = IntoIter<V, N>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { table: self }
    }
}

impl<'a, V, const N: usize> IntoIterator for &'a HashTable<V, N> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, V, const N: usize> IntoIterator for &'a mut HashTable<V, N> {
    type Item = &'a mut V;
    type IntoIter = IterMut<'a, V, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
