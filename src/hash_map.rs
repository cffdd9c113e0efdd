use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::ops::Index;

use crate::error::KeyNotFound;
use crate::hash_table::DEFAULT_BUCKET_COUNT;
#[cfg(any(test, feature = "stats"))]
use crate::hash_table::DebugStats;
use crate::hash_table::Entry as TableEntry;
use crate::hash_table::HashTable;

/// A hash map with a fixed number of chained buckets, implemented on top of
/// [`HashTable`].
///
/// `HashMap<K, V, S, N>` stores key-value pairs where keys implement
/// `Hash + Eq` and uses a configurable hasher builder `S` to hash keys. A key
/// lives in bucket `hash(key) % N`; `N` never changes, so the map never
/// rehashes and a full map simply grows longer chains.
///
/// Unlike `std::collections::HashMap`, inserting a key that is already
/// present keeps the stored value: the first insertion wins. Use
/// [`get_mut`](HashMap::get_mut) or the [`entry`](HashMap::entry) API to
/// overwrite.
///
/// # Performance Characteristics
///
/// - **Lookups**: one hash plus a scan of one chain.
/// - **Iteration and `clear`**: proportional to the number of occupied
///   buckets plus the number of entries, never to `N`.
/// - **Memory**: one empty chain and one `usize` per bucket up front, plus
///   the entries themselves.
#[derive(Clone)]
pub struct HashMap<K, V, S, const N: usize = DEFAULT_BUCKET_COUNT> {
    table: HashTable<(K, V), N>,
    hash_builder: S,
}

fn equivalent_key<Q, K, V>(key: &Q) -> impl Fn(&(K, V)) -> bool + '_
where
    K: Borrow<Q>,
    Q: ?Sized + Eq,
{
    move |entry| key.eq(entry.0.borrow())
}

impl<K, V, S, const N: usize> Debug for HashMap<K, V, S, N>
where
    K: Debug + Hash + Eq,
    V: Debug,
    S: BuildHasher,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut map = f.debug_map();
        for (k, v) in self.iter() {
            map.entry(k, v);
        }
        map.finish()
    }
}

impl<K, V, S, const N: usize> HashMap<K, V, S, N>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Creates a new hash map with the given hasher builder.
    ///
    /// The hasher builder is kept for the lifetime of the map and is
    /// available through [`hasher`](HashMap::hasher).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.is_empty());
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self {
            table: HashTable::new(),
            hash_builder,
        }
    }

    /// Creates a map from `iter` using the given hasher builder.
    ///
    /// Pairs are inserted in order; when a key repeats, the first occurrence
    /// is kept.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::DefaultHashBuilder;
    /// use chain_hash::HashMap;
    ///
    /// let map: HashMap<_, _, _> = HashMap::from_iter_with_hasher(
    ///     [(1, "a"), (2, "b"), (1, "c")],
    ///     DefaultHashBuilder::default(),
    /// );
    /// assert_eq!(map.len(), 2);
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// # }
    /// ```
    pub fn from_iter_with_hasher<I>(iter: I, hash_builder: S) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let mut map = Self::with_hasher(hash_builder);
        map.extend(iter);
        map
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map: HashMap<_, _, _> = HashMap::with_hasher(SimpleHasher);
    /// assert_eq!(map.len(), 0);
    /// map.insert(1, "a");
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` if the map contains no elements.
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Returns the fixed number of buckets, `N`.
    pub fn bucket_count(&self) -> usize {
        self.table.bucket_count()
    }

    /// Returns the number of buckets currently holding at least one entry.
    pub fn occupied_buckets(&self) -> usize {
        self.table.occupied_buckets()
    }

    /// Removes all elements from the map.
    ///
    /// Runs in time proportional to the occupied buckets and the entries, not
    /// to the bucket count.
    pub fn clear(&mut self) {
        self.table.clear();
    }

    /// Inserts a key-value pair into the map if the key is not present yet.
    ///
    /// Returns `true` if the pair was inserted. If the map already contains
    /// the key, the stored value is left untouched, `value` is dropped and
    /// `false` is returned.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map: HashMap<_, _, _> = HashMap::with_hasher(SimpleHasher);
    /// assert!(map.insert(37, "a"));
    /// assert!(!map.insert(37, "b"));
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(_) => false,
            TableEntry::Vacant(entry) => {
                entry.insert((key, value));
                true
            }
        }
    }

    /// Returns a reference to the value corresponding to the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.find(hash, equivalent_key(key)).map(|(_, v)| v)
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table
            .find_mut(hash, equivalent_key(key))
            .map(|(_, v)| v)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some()
    }

    /// Returns the value for `key`, or [`KeyNotFound`] if it is absent.
    ///
    /// Never modifies the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::DefaultHashBuilder;
    /// use chain_hash::HashMap;
    /// use chain_hash::KeyNotFound;
    ///
    /// let map: HashMap<&str, u32, DefaultHashBuilder> = HashMap::from([("one", 1)]);
    /// assert_eq!(map.at("one"), Ok(&1));
    /// assert_eq!(map.at("two"), Err(KeyNotFound));
    /// # }
    /// ```
    pub fn at<Q>(&self, key: &Q) -> Result<&V, KeyNotFound>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).ok_or(KeyNotFound)
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::DefaultHashBuilder;
    /// use chain_hash::HashMap;
    ///
    /// let mut counts: HashMap<char, usize, DefaultHashBuilder> = HashMap::new();
    /// for c in "hello".chars() {
    ///     *counts.get_or_default(c) += 1;
    /// }
    /// assert_eq!(counts.get(&'l'), Some(&2));
    /// assert_eq!(counts.get(&'h'), Some(&1));
    /// # }
    /// ```
    pub fn get_or_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Removes a key from the map, returning the value at the key if the key
    /// was previously in the map.
    ///
    /// Removing an absent key is a no-op.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map: HashMap<_, _, _> = HashMap::with_hasher(SimpleHasher);
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was previously in the map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        self.table.remove(hash, equivalent_key(key))
    }

    /// Retains only the entries for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.table.retain(|entry| f(&entry.0, &mut entry.1));
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let mut map: HashMap<_, _, _> = HashMap::with_hasher(SimpleHasher);
    ///
    /// map.entry(1).or_insert("a");
    /// map.entry(2).or_insert("b");
    /// map.entry(1).or_insert("c");
    ///
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), Some(&"b"));
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, N> {
        let hash = self.hash_builder.hash_one(&key);
        match self.table.entry(hash, |(k, _)| k == &key) {
            TableEntry::Occupied(entry) => Entry::Occupied(OccupiedEntry { entry }),
            TableEntry::Vacant(entry) => Entry::Vacant(VacantEntry { entry, key }),
        }
    }

    /// Returns an iterator positioned at the entry for `key`, or the end
    /// iterator if the key is absent.
    ///
    /// Advancing the iterator continues through the remaining entries in
    /// iteration order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::DefaultHashBuilder;
    /// use chain_hash::HashMap;
    ///
    /// let map: HashMap<i32, &str, DefaultHashBuilder> = HashMap::from([(1, "a"), (2, "b")]);
    ///
    /// let found = map.find(&2);
    /// assert_eq!(found.get(), Some((&2, &"b")));
    ///
    /// assert!(map.find(&3) == map.end());
    /// # }
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Iter<'_, K, V, N>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        Iter {
            inner: self.table.find_iter(hash, equivalent_key(key)),
        }
    }

    /// Mutable counterpart of [`find`](HashMap::find).
    ///
    /// # Examples
    ///
    /// ```rust
    /// # #[cfg(any(feature = "std", feature = "foldhash"))]
    /// # {
    /// use chain_hash::DefaultHashBuilder;
    /// use chain_hash::HashMap;
    ///
    /// let mut map: HashMap<i32, String, DefaultHashBuilder> =
    ///     HashMap::from([(1, "a".to_string())]);
    ///
    /// if let Some((_, value)) = map.find_mut(&1).get_mut() {
    ///     value.push('!');
    /// }
    /// assert_eq!(map.get(&1).map(String::as_str), Some("a!"));
    /// # }
    /// ```
    pub fn find_mut<Q>(&mut self, key: &Q) -> IterMut<'_, K, V, N>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        IterMut {
            inner: self.table.find_iter_mut(hash, equivalent_key(key)),
        }
    }

    /// Returns an iterator over the key-value pairs of the map.
    ///
    /// Entries are grouped by bucket. Buckets come in the order in which they
    /// became non-empty, and within a bucket the newest entry comes first.
    /// That order changes whenever a removal empties a bucket.
    pub fn iter(&self) -> Iter<'_, K, V, N> {
        Iter {
            inner: self.table.iter(),
        }
    }

    /// Returns an iterator over the key-value pairs of the map, with mutable
    /// references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, N> {
        IterMut {
            inner: self.table.iter_mut(),
        }
    }

    /// Returns the end iterator: the position one past the last entry.
    pub fn end(&self) -> Iter<'_, K, V, N> {
        Iter {
            inner: self.table.end(),
        }
    }

    /// Mutable counterpart of [`end`](HashMap::end).
    pub fn end_mut(&mut self) -> IterMut<'_, K, V, N> {
        IterMut {
            inner: self.table.end_mut(),
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V, N> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V, N> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the map.
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V, N> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Returns an iterator that removes and yields all key-value pairs from the
    /// map.
    ///
    /// After calling `drain()`, the map will be empty.
    pub fn drain(&mut self) -> Drain<'_, K, V, N> {
        Drain {
            inner: self.table.drain(),
        }
    }

    /// Computes a histogram of chain lengths; see
    /// [`HashTable::chain_histogram`].
    #[cfg(any(test, feature = "stats"))]
    pub fn chain_histogram(&self) -> alloc::vec::Vec<usize> {
        self.table.chain_histogram()
    }

    /// Returns bucket utilization statistics for debugging.
    #[cfg(any(test, feature = "stats"))]
    pub fn debug_stats(&self) -> DebugStats {
        self.table.debug_stats()
    }

    /// Pretty-prints the chain-length histogram using stdout.
    #[cfg(all(any(test, feature = "stats"), feature = "std"))]
    pub fn print_chain_histogram(&self) {
        self.table.print_chain_histogram();
    }
}

impl<K, V, S, const N: usize> HashMap<K, V, S, N>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Creates a new hash map using the default hasher builder.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use siphasher::sip::SipHasher;
    /// #
    /// # use chain_hash::HashMap;
    /// #
    /// # #[derive(Default)]
    /// # struct SimpleHasher;
    /// # impl BuildHasher for SimpleHasher {
    /// #     type Hasher = SipHasher;
    /// #
    /// #     fn build_hasher(&self) -> Self::Hasher {
    /// #         SipHasher::new()
    /// #     }
    /// # }
    /// #
    /// let map: HashMap<i32, String, SimpleHasher, 64> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.bucket_count(), 64);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S, const N: usize> Default for HashMap<K, V, S, N>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S, const N: usize> PartialEq for HashMap<K, V, S, N>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        self.iter().all(|(k, v)| other.get(k) == Some(v))
    }
}

impl<K, V, S, const N: usize> Eq for HashMap<K, V, S, N>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S, const N: usize> Index<&Q> for HashMap<K, V, S, N>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// Returns a reference to the value for `key`.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the map.
    fn index(&self, key: &Q) -> &V {
        match self.at(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<K, V, S, const N: usize> Extend<(K, V)> for HashMap<K, V, S, N>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Inserts every pair in order. Keys already present keep their value.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K, V, S, const N: usize> FromIterator<(K, V)> for HashMap<K, V, S, N>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_iter_with_hasher(iter, S::default())
    }
}

impl<K, V, S, const N: usize, const M: usize> From<[(K, V); M]> for HashMap<K, V, S, N>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    fn from(pairs: [(K, V); M]) -> Self {
        Self::from_iter(pairs)
    }
}

impl<K, V, S, const N: usize> IntoIterator for HashMap<K, V, S, N> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V, N>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            inner: self.table.into_iter(),
        }
    }
}

impl<'a, K, V, S, const N: usize> IntoIterator for &'a HashMap<K, V, S, N>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S, const N: usize> IntoIterator for &'a mut HashMap<K, V, S, N>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V, N>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, N>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, N>),
}

impl<'a, K, V, const N: usize> Entry<'a, K, V, N> {
    /// Inserts a default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, const N: usize> Entry<'a, K, V, N>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    entry: crate::hash_table::VacantEntry<'a, (K, V), N>,
    key: K,
}

impl<'a, K, V, const N: usize> VacantEntry<'a, K, V, N> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    pub fn insert(self, value: V) -> &'a mut V {
        &mut self.entry.insert((self.key, value)).1
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    entry: crate::hash_table::OccupiedEntry<'a, (K, V), N>,
}

impl<'a, K, V, const N: usize> OccupiedEntry<'a, K, V, N> {
    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        &self.entry.get().0
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.entry.get().1
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        &mut self.entry.get_mut().1
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.entry.into_mut().1
    }

    /// Replaces the value in the entry and returns the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(&mut self.entry.get_mut().1, value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.entry.remove().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        self.entry.remove()
    }
}

/// An iterator over the key-value pairs of a `HashMap`.
///
/// Besides plain iteration, an `Iter` doubles as a position in the map: see
/// [`HashMap::find`] and [`HashMap::end`]. Two iterators are equal when they
/// point at the same entry, or are both exhausted.
pub struct Iter<'a, K, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    inner: crate::hash_table::Iter<'a, (K, V), N>,
}

impl<'a, K, V, const N: usize> Iter<'a, K, V, N> {
    /// Returns the entry at the current position without advancing.
    pub fn get(&self) -> Option<(&'a K, &'a V)> {
        self.inner.get().map(|(k, v)| (k, v))
    }

    /// Returns `true` if this is the end iterator.
    pub fn is_end(&self) -> bool {
        self.inner.is_end()
    }
}

impl<K, V, const N: usize> Clone for Iter<'_, K, V, N> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V, const N: usize> PartialEq for Iter<'_, K, V, N> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<K, V, const N: usize> Eq for Iter<'_, K, V, N> {}

impl<'a, K, V, const N: usize> Iterator for Iter<'a, K, V, N> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, const N: usize> FusedIterator for Iter<'_, K, V, N> {}

impl<'a, K, V, const N: usize> From<IterMut<'a, K, V, N>> for Iter<'a, K, V, N> {
    fn from(iter: IterMut<'a, K, V, N>) -> Self {
        Self {
            inner: iter.inner.into(),
        }
    }
}

/// A mutable iterator over the key-value pairs of a `HashMap`.
///
/// Keys are only ever handed out by shared reference.
pub struct IterMut<'a, K, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    inner: crate::hash_table::IterMut<'a, (K, V), N>,
}

impl<K, V, const N: usize> IterMut<'_, K, V, N> {
    /// Returns the entry at the current position without advancing.
    pub fn get(&self) -> Option<(&K, &V)> {
        self.inner.get().map(|(k, v)| (k, v))
    }

    /// Returns the entry at the current position, with a mutable value,
    /// without advancing.
    pub fn get_mut(&mut self) -> Option<(&K, &mut V)> {
        self.inner.get_mut().map(|(k, v)| (&*k, v))
    }

    /// Returns `true` if this is the end iterator.
    pub fn is_end(&self) -> bool {
        self.inner.is_end()
    }
}

impl<K, V, const N: usize> PartialEq for IterMut<'_, K, V, N> {
    fn eq(&self, other: &Self) -> bool {
        self.inner == other.inner
    }
}

impl<K, V, const N: usize> Eq for IterMut<'_, K, V, N> {}

impl<'a, K, V, const N: usize> Iterator for IterMut<'a, K, V, N> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, v)| (&*k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, const N: usize> FusedIterator for IterMut<'_, K, V, N> {}

/// An iterator over the keys of a `HashMap`.
pub struct Keys<'a, K, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    inner: Iter<'a, K, V, N>,
}

impl<'a, K, V, const N: usize> Iterator for Keys<'a, K, V, N> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// An iterator over the values of a `HashMap`.
pub struct Values<'a, K, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    inner: Iter<'a, K, V, N>,
}

impl<'a, K, V, const N: usize> Iterator for Values<'a, K, V, N> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// A mutable iterator over the values of a `HashMap`.
pub struct ValuesMut<'a, K, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    inner: IterMut<'a, K, V, N>,
}

impl<'a, K, V, const N: usize> Iterator for ValuesMut<'a, K, V, N> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

/// A draining iterator over the key-value pairs of a `HashMap`.
pub struct Drain<'a, K, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    inner: crate::hash_table::Drain<'a, (K, V), N>,
}

impl<K, V, const N: usize> Iterator for Drain<'_, K, V, N> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, const N: usize> ExactSizeIterator for Drain<'_, K, V, N> {}

/// An owning iterator over the key-value pairs of a `HashMap`.
pub struct IntoIter<K, V, const N: usize = DEFAULT_BUCKET_COUNT> {
    inner: crate::hash_table::IntoIter<(K, V), N>,
}

impl<K, V, const N: usize> Iterator for IntoIter<K, V, N> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, const N: usize> ExactSizeIterator for IntoIter<K, V, N> {}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;
    use alloc::vec;
    use alloc::vec::Vec;
    use core::hash::BuildHasher;
    use core::hash::Hasher;

    use rand::Rng;
    use rand::SeedableRng;
    use rand::TryRngCore;
    use rand::rngs::OsRng;
    use rand::rngs::SmallRng;
    use siphasher::sip::SipHasher;

    use super::*;

    #[derive(Clone)]
    struct SipHashBuilder {
        k1: u64,
        k2: u64,
    }

    impl BuildHasher for SipHashBuilder {
        type Hasher = SipHasher;

        fn build_hasher(&self) -> Self::Hasher {
            SipHasher::new_with_keys(self.k1, self.k2)
        }
    }

    impl Default for SipHashBuilder {
        fn default() -> Self {
            let mut rng = OsRng;
            Self {
                k1: rng.try_next_u64().unwrap_or(0),
                k2: rng.try_next_u64().unwrap_or(0),
            }
        }
    }

    /// Sends every key to bucket 0.
    #[derive(Clone, Default)]
    struct ZeroHashBuilder;

    struct ZeroHasher;

    impl Hasher for ZeroHasher {
        fn finish(&self) -> u64 {
            0
        }

        fn write(&mut self, _bytes: &[u8]) {}
    }

    impl BuildHasher for ZeroHashBuilder {
        type Hasher = ZeroHasher;

        fn build_hasher(&self) -> Self::Hasher {
            ZeroHasher
        }
    }

    type SmallMap<K, V> = HashMap<K, V, SipHashBuilder, 8>;

    fn sorted_pairs<K: Ord + Clone, V: Ord + Clone, S: BuildHasher, const N: usize>(
        map: &HashMap<K, V, S, N>,
    ) -> Vec<(K, V)>
    where
        K: Hash,
    {
        let mut pairs: Vec<(K, V)> = map.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        pairs.sort();
        pairs
    }

    #[test]
    fn test_new_and_with_hasher() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::new();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.bucket_count(), DEFAULT_BUCKET_COUNT);

        let map2 = HashMap::<i32, String, _, 16>::with_hasher(SipHashBuilder::default());
        assert!(map2.is_empty());
        assert_eq!(map2.bucket_count(), 16);
        assert_eq!(map2.occupied_buckets(), 0);
    }

    #[test]
    fn test_hasher_is_kept() {
        let builder = SipHashBuilder { k1: 7, k2: 11 };
        let map: SmallMap<i32, i32> = HashMap::with_hasher(builder);
        assert_eq!(map.hasher().k1, 7);
        assert_eq!(map.hasher().k2, 11);
    }

    #[test]
    fn test_insert_first_wins() {
        let mut map: HashMap<i32, &str, SipHashBuilder> = HashMap::new();

        assert!(map.insert(1, "a"));
        assert!(map.insert(2, "b"));
        assert!(!map.insert(1, "c"));

        assert_eq!(map.len(), 2);
        assert_eq!(map.find(&1).get(), Some((&1, &"a")));
        assert_eq!(map.find(&2).get(), Some((&2, &"b")));

        assert_eq!(map.remove(&1), Some("a"));
        assert_eq!(map.len(), 1);
        assert!(map.find(&1) == map.end());
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![(&2, &"b")]);
    }

    #[test]
    fn test_get_mut() {
        let mut map: SmallMap<i32, String> = HashMap::new();
        map.insert(1, "hello".to_string());

        if let Some(value) = map.get_mut(&1) {
            value.push_str(" world");
        }

        assert_eq!(map.get(&1), Some(&"hello world".to_string()));
        assert_eq!(map.get_mut(&2), None);
    }

    #[test]
    fn test_contains_key() {
        let mut map: SmallMap<i32, String> = HashMap::new();
        assert!(!map.contains_key(&1));

        map.insert(1, "value".to_string());
        assert!(map.contains_key(&1));
        assert!(!map.contains_key(&2));
    }

    #[test]
    fn test_remove() {
        let mut map: SmallMap<i32, String> = HashMap::new();
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());

        assert_eq!(map.remove(&1), Some("hello".to_string()));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&1));
        assert!(map.contains_key(&2));

        assert_eq!(map.remove(&1), None);
        assert_eq!(map.remove(&3), None);
        map.table.assert_invariants();
    }

    #[test]
    fn test_remove_absent_changes_nothing() {
        let mut map: SmallMap<u32, u32> = (0..20).map(|i| (i, i * 10)).collect();
        let before = sorted_pairs(&map);

        assert_eq!(map.remove(&100), None);
        assert_eq!(map.len(), 20);
        assert_eq!(sorted_pairs(&map), before);
        for i in 0..20 {
            assert_eq!(map.get(&i), Some(&(i * 10)));
        }
        map.table.assert_invariants();
    }

    #[test]
    fn test_remove_entry() {
        let mut map: SmallMap<i32, String> = HashMap::new();
        map.insert(1, "hello".to_string());

        assert_eq!(map.remove_entry(&1), Some((1, "hello".to_string())));
        assert_eq!(map.len(), 0);
        assert_eq!(map.remove_entry(&1), None);
    }

    #[test]
    fn test_find_and_advance() {
        let mut map: HashMap<u64, u64, ZeroHashBuilder, 4> = HashMap::new();
        for k in 0..4 {
            map.insert(k, k * 100);
        }

        // All keys share one chain, newest first.
        let order: Vec<u64> = map.keys().copied().collect();
        assert_eq!(order, vec![3, 2, 1, 0]);

        let mut it = map.find(&2);
        assert_eq!(it.get(), Some((&2, &200)));
        assert_eq!(it.next(), Some((&2, &200)));
        assert_eq!(it.next(), Some((&1, &100)));
        assert!(it == map.find(&0));
        it.next();
        assert!(it.is_end());
        assert!(it == map.end());

        assert!(map.find(&9).is_end());
        assert!(map.iter() == map.find(&3));
    }

    #[test]
    fn test_find_mut_modifies_value() {
        let mut map: SmallMap<i32, i32> = HashMap::from([(1, 1), (2, 2)]);

        let mut it = map.find_mut(&2);
        if let Some((key, value)) = it.get_mut() {
            assert_eq!(*key, 2);
            *value = 20;
        }
        assert_eq!(it.get(), Some((&2, &20)));
        assert!(!it.is_end());

        assert!(map.find_mut(&3).is_end());
        assert!(map.end_mut().is_end());
        assert_eq!(map.get(&2), Some(&20));
    }

    #[test]
    fn test_iter_mut_downgrade() {
        let mut map: HashMap<u64, u64, ZeroHashBuilder, 4> = HashMap::new();
        map.insert(1, 1);
        map.insert(2, 2);

        let mut it = map.iter_mut();
        if let Some((_, v)) = it.next() {
            *v += 10;
        }
        let rest: Iter<'_, u64, u64, 4> = it.into();
        assert_eq!(rest.collect::<Vec<_>>(), vec![(&1, &1)]);
        assert_eq!(map.get(&2), Some(&12));
    }

    #[test]
    fn test_get_or_default() {
        let mut map: SmallMap<String, Vec<i32>> = HashMap::new();

        map.get_or_default("a".to_string()).push(1);
        assert_eq!(map.len(), 1);
        assert_eq!(map.find("a").get(), Some((&"a".to_string(), &vec![1])));

        map.get_or_default("a".to_string()).push(2);
        assert_eq!(map.get("a"), Some(&vec![1, 2]));

        assert!(map.get_or_default("b".to_string()).is_empty());
        assert_eq!(map.get("b"), Some(&Vec::new()));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_at() {
        let map: SmallMap<i32, &str> = HashMap::from([(1, "one")]);

        assert_eq!(map.at(&1), Ok(&"one"));
        assert_eq!(map.at(&2), Err(KeyNotFound));
        assert_eq!(map.len(), 1);
        assert!(!map.contains_key(&2));
        assert_eq!(
            KeyNotFound.to_string(),
            "key is not contained in the hash map"
        );
    }

    #[test]
    fn test_index() {
        let map: SmallMap<String, i32> = HashMap::from([("x".to_string(), 5)]);
        assert_eq!(map["x"], 5);
    }

    #[test]
    #[should_panic(expected = "key is not contained in the hash map")]
    fn test_index_missing_key_panics() {
        let map: SmallMap<i32, i32> = HashMap::new();
        let _value = map[&1];
    }

    #[test]
    fn test_clear() {
        let mut map: SmallMap<i32, String> = HashMap::new();
        map.insert(1, "hello".to_string());
        map.insert(2, "world".to_string());

        assert_eq!(map.len(), 2);
        map.clear();
        assert_eq!(map.len(), 0);
        assert!(map.is_empty());
        assert!(!map.contains_key(&1));
        assert!(!map.contains_key(&2));
        assert_eq!(map.iter().count(), 0);
        assert!(map.iter() == map.end());
        assert_eq!(map.occupied_buckets(), 0);

        map.insert(3, "again".to_string());
        assert_eq!(map.get(&3), Some(&"again".to_string()));
        map.table.assert_invariants();
    }

    #[test]
    fn test_entry_api() {
        let mut map: SmallMap<i32, String> = HashMap::new();

        let value = map.entry(1).or_insert("hello".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        let value = map.entry(1).or_insert("world".to_string());
        assert_eq!(value, &"hello".to_string());
        assert_eq!(map.len(), 1);

        map.entry(2).or_insert_with(|| "computed".to_string());
        assert_eq!(map.get(&2), Some(&"computed".to_string()));

        map.entry(1)
            .and_modify(|v| v.push_str(" world"))
            .or_insert("default".to_string());
        assert_eq!(map.get(&1), Some(&"hello world".to_string()));

        assert_eq!(map.entry(3).key(), &3);
    }

    #[test]
    fn test_entry_or_default() {
        let mut map: SmallMap<i32, Vec<i32>> = HashMap::new();

        map.entry(1).or_default().push(42);
        assert_eq!(map.get(&1), Some(&vec![42]));

        map.entry(1).or_default().push(24);
        assert_eq!(map.get(&1), Some(&vec![42, 24]));
    }

    #[test]
    fn test_occupied_entry() {
        let mut map: SmallMap<i32, String> = HashMap::new();
        map.insert(1, "hello".to_string());

        match map.entry(1) {
            Entry::Occupied(mut entry) => {
                assert_eq!(entry.key(), &1);
                assert_eq!(entry.get(), &"hello".to_string());

                *entry.get_mut() = "world".to_string();
                assert_eq!(entry.get(), &"world".to_string());

                let old_value = entry.insert("new".to_string());
                assert_eq!(old_value, "world".to_string());
                assert_eq!(entry.get(), &"new".to_string());

                let (key, value) = entry.remove_entry();
                assert_eq!(key, 1);
                assert_eq!(value, "new".to_string());
            }
            Entry::Vacant(_) => panic!("Expected occupied entry"),
        }

        assert!(map.is_empty());
        map.table.assert_invariants();
    }

    #[test]
    fn test_vacant_entry() {
        let mut map: SmallMap<i32, String> = HashMap::new();

        match map.entry(1) {
            Entry::Vacant(entry) => {
                assert_eq!(entry.key(), &1);

                let value = entry.insert("hello".to_string());
                assert_eq!(value, &"hello".to_string());
            }
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }

        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&1), Some(&"hello".to_string()));

        match map.entry(2) {
            Entry::Vacant(entry) => assert_eq!(entry.into_key(), 2),
            Entry::Occupied(_) => panic!("Expected vacant entry"),
        }
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_iterators() {
        let mut map: SmallMap<i32, String> = HashMap::new();
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(3, "three".to_string());

        let pairs: std::collections::HashMap<i32, String> =
            map.iter().map(|(k, v)| (*k, v.clone())).collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs.get(&1), Some(&"one".to_string()));
        assert_eq!(pairs.get(&2), Some(&"two".to_string()));
        assert_eq!(pairs.get(&3), Some(&"three".to_string()));

        let keys: std::collections::HashSet<i32> = map.keys().copied().collect();
        assert_eq!(keys.len(), 3);
        assert!(keys.contains(&1));
        assert!(keys.contains(&2));
        assert!(keys.contains(&3));

        let values: std::collections::HashSet<String> = map.values().cloned().collect();
        assert_eq!(values.len(), 3);
        assert!(values.contains("one"));
        assert!(values.contains("two"));
        assert!(values.contains("three"));

        for value in map.values_mut() {
            value.make_ascii_uppercase();
        }
        assert_eq!(map.get(&2), Some(&"TWO".to_string()));

        for (key, value) in &mut map {
            value.push_str(&key.to_string());
        }
        assert_eq!(map.get(&3), Some(&"THREE3".to_string()));

        let mut total = 0;
        for (key, _) in &map {
            total += key;
        }
        assert_eq!(total, 6);
    }

    #[test]
    fn test_iteration_visits_every_entry_once() {
        let mut map: SmallMap<u32, u32> = HashMap::new();
        for i in 0..200 {
            map.insert(i, i + 1);
        }
        for i in (0..200).step_by(3) {
            map.remove(&i);
        }

        let visited: Vec<(u32, u32)> = map.iter().map(|(k, v)| (*k, *v)).collect();
        assert_eq!(visited.len(), map.len());

        let unique: std::collections::HashSet<u32> = visited.iter().map(|(k, _)| *k).collect();
        assert_eq!(unique.len(), visited.len());

        let expected: std::collections::HashSet<(u32, u32)> =
            (0..200).filter(|i| i % 3 != 0).map(|i| (i, i + 1)).collect();
        assert_eq!(
            visited.into_iter().collect::<std::collections::HashSet<_>>(),
            expected
        );
    }

    #[test]
    fn test_round_trip_from_pairs() {
        let input: Vec<(String, usize)> = (0..50).map(|i| (format!("key_{i}"), i)).collect();
        let map: SmallMap<String, usize> = input.iter().cloned().collect();

        assert_eq!(map.len(), input.len());
        let mut expected = input.clone();
        expected.sort();
        assert_eq!(sorted_pairs(&map), expected);
    }

    #[test]
    fn test_from_iter_first_occurrence_wins() {
        let map: SmallMap<i32, &str> = [(1, "a"), (2, "b"), (1, "c"), (2, "d")]
            .into_iter()
            .collect();
        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&1), Some(&"a"));
        assert_eq!(map.get(&2), Some(&"b"));

        let map = HashMap::<_, _, _, 8>::from_iter_with_hasher(
            vec![(3, 'x'), (3, 'y')],
            SipHashBuilder { k1: 1, k2: 2 },
        );
        assert_eq!(map.get(&3), Some(&'x'));
        assert_eq!(map.hasher().k1, 1);
    }

    #[test]
    fn test_from_array_literal() {
        let map: SmallMap<&str, i32> = HashMap::from([("a", 1), ("b", 2), ("a", 3)]);
        assert_eq!(map.len(), 2);
        assert_eq!(map["a"], 1);
        assert_eq!(map["b"], 2);
    }

    #[test]
    fn test_extend_keeps_existing_values() {
        let mut map: SmallMap<i32, i32> = HashMap::from([(1, 10)]);
        map.extend([(1, 100), (2, 20)]);
        assert_eq!(map.get(&1), Some(&10));
        assert_eq!(map.get(&2), Some(&20));
    }

    #[test]
    fn test_drain() {
        let mut map: SmallMap<i32, String> = HashMap::new();
        map.insert(1, "one".to_string());
        map.insert(2, "two".to_string());
        map.insert(3, "three".to_string());

        let drained: std::collections::HashMap<i32, String> = map.drain().collect();
        assert_eq!(drained.len(), 3);
        assert!(map.is_empty());
        map.table.assert_invariants();

        assert_eq!(drained.get(&1), Some(&"one".to_string()));
        assert_eq!(drained.get(&2), Some(&"two".to_string()));
        assert_eq!(drained.get(&3), Some(&"three".to_string()));
    }

    #[test]
    fn test_into_iter() {
        let map: SmallMap<i32, i32> = (0..30).map(|i| (i, -i)).collect();
        let it = map.into_iter();
        assert_eq!(it.len(), 30);

        let mut pairs: Vec<(i32, i32)> = it.collect();
        pairs.sort();
        assert_eq!(pairs, (0..30).map(|i| (i, -i)).collect::<Vec<_>>());
    }

    #[test]
    fn test_retain() {
        let mut map: SmallMap<i32, i32> = (0..100).map(|i| (i, i)).collect();
        map.retain(|k, v| {
            *v *= 2;
            k % 4 == 0
        });

        assert_eq!(map.len(), 25);
        for i in (0..100).step_by(4) {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }
        map.table.assert_invariants();
    }

    #[test]
    fn test_collision_handling() {
        let mut map: HashMap<i32, i32, ZeroHashBuilder, 8> = HashMap::new();

        for i in 0..100 {
            map.insert(i, i * 2);
        }

        assert_eq!(map.len(), 100);
        assert_eq!(map.occupied_buckets(), 1);

        for i in 0..100 {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }

        for i in (0..100).step_by(2) {
            assert_eq!(map.remove(&i), Some(i * 2));
        }

        assert_eq!(map.len(), 50);

        for i in (1..100).step_by(2) {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }

        for i in (1..100).step_by(2) {
            map.remove(&i);
        }
        assert!(map.is_empty());
        assert_eq!(map.occupied_buckets(), 0);
        map.table.assert_invariants();
    }

    #[test]
    fn test_many_keys_over_few_buckets() {
        let mut map: SmallMap<u64, u64> = HashMap::new();

        for i in 0..1000 {
            map.insert(i, i * 2);
        }

        assert_eq!(map.len(), 1000);
        assert!(map.occupied_buckets() <= 8);
        let stats = map.debug_stats();
        assert_eq!(stats.populated, 1000);
        assert!(stats.longest_chain >= 125);
        assert_eq!(map.chain_histogram().iter().sum::<usize>(), 8);

        for i in 0..1000 {
            assert_eq!(map.get(&i), Some(&(i * 2)));
        }
    }

    #[test]
    fn test_string_keys() {
        let mut map: HashMap<String, i32, SipHashBuilder> = HashMap::new();

        map.insert("hello".to_string(), 1);
        map.insert("world".to_string(), 2);
        map.insert("rust".to_string(), 3);

        assert_eq!(map.get("hello"), Some(&1));
        assert_eq!(map.get(&"world".to_string()), Some(&2));
        assert_eq!(map.get("rust"), Some(&3));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_default_trait() {
        let map: HashMap<i32, String, SipHashBuilder> = HashMap::default();
        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn test_equality_ignores_order() {
        let a: SmallMap<i32, i32> = HashMap::from([(1, 1), (2, 2), (3, 3)]);
        let b: SmallMap<i32, i32> = HashMap::from([(3, 3), (1, 1), (2, 2)]);
        let c: SmallMap<i32, i32> = HashMap::from([(1, 1), (2, 2), (3, 4)]);

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn test_debug_format() {
        let map: SmallMap<i32, &str> = HashMap::from([(1, "a")]);
        assert_eq!(format!("{map:?}"), "{1: \"a\"}");
    }

    #[test]
    fn test_randomized_against_std() {
        let mut rng = SmallRng::seed_from_u64(0xc4a1);
        let mut map: HashMap<u16, u32, SipHashBuilder, 32> = HashMap::new();
        let mut model = std::collections::HashMap::new();

        for _ in 0..5_000 {
            let key = rng.random_range(0..256u16);
            match rng.random_range(0..4) {
                0 | 1 => {
                    let value = rng.random::<u32>();
                    let inserted = map.insert(key, value);
                    assert_eq!(inserted, !model.contains_key(&key));
                    model.entry(key).or_insert(value);
                }
                2 => assert_eq!(map.remove(&key), model.remove(&key)),
                _ => {
                    *map.get_or_default(key) += 1;
                    *model.entry(key).or_default() += 1;
                }
            }
            assert_eq!(map.len(), model.len());
        }
        map.table.assert_invariants();

        for (k, v) in &model {
            assert_eq!(map.at(k), Ok(v));
        }
        assert_eq!(map.iter().count(), model.len());
    }
}
