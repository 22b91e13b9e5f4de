//! Span storage layer
//!
//! Run-length format spans kept in an arena-backed doubly linked list. Spans are addressed by
//! [`SpanId`] keys that stay valid until the span is deleted or the store is compacted.
//!
//! Reclaimed slots go to a free-list and are reused by later insertions, so steady editing does
//! not grow the backing storage. When heavy churn leaves the arena sparse (live spans below
//! `1 / compaction_ratio` of the slots), the store rebuilds itself in document order and hands
//! back a [`Compaction`] describing how old keys map to new ones.

use std::ops::{Index, IndexMut};

/// Stable key of a span inside a [`SpanStore`].
///
/// A key combines the arena slot with the generation the slot had when the span was created.
/// Generations come from a store-wide counter, so the key of a deleted span is never mistaken for
/// a later span reusing the same slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId {
    slot: usize,
    generation: u64,
}

impl SpanId {
    /// Arena slot this key points at.
    pub fn slot(self) -> usize {
        self.slot
    }
}

/// A run of consecutive characters sharing one format value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span<F> {
    /// Number of characters covered by the span.
    pub len: usize,
    /// Format applied to the whole run.
    pub format: F,
}

impl<F> Span<F> {
    /// Create a span of `len` characters carrying `format`.
    pub fn new(len: usize, format: F) -> Self {
        Self { len, format }
    }
}

/// Tuning knobs of a [`SpanStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// Compact when `live * compaction_ratio < slots`. `0` disables automatic compaction.
    pub compaction_ratio: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            compaction_ratio: 100,
        }
    }
}

#[derive(Debug, Clone)]
struct Node<F> {
    span: Span<F>,
    prev: Option<usize>,
    next: Option<usize>,
}

#[derive(Debug, Clone)]
struct Slot<F> {
    generation: u64,
    node: Option<Node<F>>,
}

/// Key remapping produced by rebuilding a [`SpanStore`].
///
/// Every key issued before the rebuild is stale afterwards; [`Compaction::translate`] turns a
/// pre-compaction key into the key of the same span in the rebuilt store.
#[derive(Debug, Clone, Default)]
pub struct Compaction {
    /// Indexed by old slot: `(old generation, new key)` for slots that held a live span.
    remap: Vec<Option<(u64, SpanId)>>,
}

impl Compaction {
    /// Key of the span formerly known as `old`, or `None` if `old` was already stale.
    pub fn translate(&self, old: SpanId) -> Option<SpanId> {
        match self.remap.get(old.slot) {
            Some(Some((generation, new))) if *generation == old.generation => Some(*new),
            _ => None,
        }
    }

    /// Number of spans carried over by the rebuild.
    pub fn moved(&self) -> usize {
        self.remap.iter().flatten().count()
    }
}

/// Ordered list of spans with O(1) neighbor access, insertion and removal.
#[derive(Debug, Clone)]
pub struct SpanStore<F> {
    slots: Vec<Slot<F>>,
    /// Vacant slots available for reuse
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
    next_generation: u64,
    config: StoreConfig,
}

impl<F> SpanStore<F> {
    /// Create an empty store with the default configuration.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with a custom configuration.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
            next_generation: 0,
            config,
        }
    }

    /// Build a store holding a copy of `spans`, in order.
    pub fn from_spans(spans: &[Span<F>]) -> Self
    where
        F: Clone,
    {
        Self::from_spans_with_config(spans, StoreConfig::default())
    }

    /// [`SpanStore::from_spans`] with a custom configuration.
    pub fn from_spans_with_config(spans: &[Span<F>], config: StoreConfig) -> Self
    where
        F: Clone,
    {
        let mut store = Self::with_config(config);
        let mut last = None;
        for span in spans {
            last = Some(store.create(span.clone(), last));
        }
        store
    }

    /// Current configuration.
    pub fn config(&self) -> StoreConfig {
        self.config
    }

    /// Replace the configuration. Takes effect at the next compaction check.
    pub fn set_config(&mut self, config: StoreConfig) {
        self.config = config;
    }

    /// Number of live spans.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the store holds no span.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of arena slots, live or vacant.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// First span in document order.
    pub fn root(&self) -> Option<SpanId> {
        self.head.map(|slot| self.id_at(slot))
    }

    /// Last span in document order.
    pub fn last(&self) -> Option<SpanId> {
        self.tail.map(|slot| self.id_at(slot))
    }

    /// Whether `id` names a live span.
    pub fn contains(&self, id: SpanId) -> bool {
        self.resolve(id).is_some()
    }

    /// The span named by `id`, or `None` if the key is stale.
    pub fn get(&self, id: SpanId) -> Option<&Span<F>> {
        let slot = self.resolve(id)?;
        self.slots[slot].node.as_ref().map(|node| &node.span)
    }

    /// Mutable access to the span named by `id`, or `None` if the key is stale.
    pub fn get_mut(&mut self, id: SpanId) -> Option<&mut Span<F>> {
        let slot = self.resolve(id)?;
        self.slots[slot].node.as_mut().map(|node| &mut node.span)
    }

    /// Successor of `id`, `None` at the end of the list.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn next(&self, id: SpanId) -> Option<SpanId> {
        let slot = self.live_slot(id);
        self.node(slot).next.map(|next| self.id_at(next))
    }

    /// Predecessor of `id`, `None` for the root.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn previous(&self, id: SpanId) -> Option<SpanId> {
        let slot = self.live_slot(id);
        self.node(slot).prev.map(|prev| self.id_at(prev))
    }

    /// Insert `span` right after `after`, or as the new root when `after` is `None`.
    ///
    /// # Panics
    ///
    /// Panics if `after` is stale.
    pub fn create(&mut self, span: Span<F>, after: Option<SpanId>) -> SpanId {
        let after = after.map(|id| self.live_slot(id));
        let slot = self.allocate(span);

        match after {
            None => {
                let old_head = self.head;
                {
                    let node = self.node_mut(slot);
                    node.prev = None;
                    node.next = old_head;
                }
                match old_head {
                    Some(old) => self.node_mut(old).prev = Some(slot),
                    None => self.tail = Some(slot),
                }
                self.head = Some(slot);
            }
            Some(prev) => {
                let successor = self.node(prev).next;
                {
                    let node = self.node_mut(slot);
                    node.prev = Some(prev);
                    node.next = successor;
                }
                self.node_mut(prev).next = Some(slot);
                match successor {
                    Some(succ) => self.node_mut(succ).prev = Some(slot),
                    None => self.tail = Some(slot),
                }
            }
        }

        self.len += 1;
        self.id_at(slot)
    }

    /// Remove `id` from the list and return its span, without any compaction check.
    ///
    /// Keys held by the caller stay valid. Deleting the last span resets the arena.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    pub fn unlink(&mut self, id: SpanId) -> Span<F> {
        let slot = self.live_slot(id);
        let Some(node) = self.slots[slot].node.take() else {
            unreachable!("live slot {slot} has no node");
        };

        match node.prev {
            Some(prev) => self.node_mut(prev).next = node.next,
            None => self.head = node.next,
        }
        match node.next {
            Some(next) => self.node_mut(next).prev = node.prev,
            None => self.tail = node.prev,
        }

        self.free.push(slot);
        self.len -= 1;
        if self.len == 0 {
            self.reset();
        }
        node.span
    }

    /// Remove `id`, then compact the arena if it became sparse.
    ///
    /// When a compaction happens, every previously issued key is invalidated and the returned
    /// [`Compaction`] must be used to translate the keys still in use.
    ///
    /// # Panics
    ///
    /// Panics if `id` is stale.
    #[must_use = "a compaction invalidates every key issued so far"]
    pub fn delete(&mut self, id: SpanId) -> Option<Compaction> {
        self.unlink(id);
        self.compact_if_sparse()
    }

    /// Compact the arena if live spans fell below the configured density.
    #[must_use = "a compaction invalidates every key issued so far"]
    pub fn compact_if_sparse(&mut self) -> Option<Compaction> {
        let ratio = self.config.compaction_ratio;
        if ratio == 0 || self.len == 0 {
            return None;
        }
        if self.len.saturating_mul(ratio) < self.slots.len() {
            Some(self.compact())
        } else {
            None
        }
    }

    /// Rebuild the arena so that spans occupy slots `0..len` in document order.
    pub fn compact(&mut self) -> Compaction {
        tracing::trace!(
            live = self.len,
            capacity = self.slots.len(),
            "compacting span store"
        );

        let old_slots = std::mem::take(&mut self.slots);
        let mut old_nodes: Vec<Option<(u64, Node<F>)>> = old_slots
            .into_iter()
            .map(|slot| slot.node.map(|node| (slot.generation, node)))
            .collect();
        let mut remap = vec![None; old_nodes.len()];

        self.free.clear();
        let count = self.len;
        let mut cursor = self.head;
        let mut index = 0;
        while let Some(old) = cursor {
            if index == count {
                panic!("span store: broken successor chain (more than {count} spans)");
            }
            let Some((old_generation, node)) = old_nodes[old].take() else {
                panic!("span store: successor chain reaches vacant slot {old}");
            };
            cursor = node.next;

            let generation = self.bump_generation();
            self.slots.push(Slot {
                generation,
                node: Some(Node {
                    span: node.span,
                    prev: index.checked_sub(1),
                    next: (index + 1 < count).then_some(index + 1),
                }),
            });
            remap[old] = Some((
                old_generation,
                SpanId {
                    slot: index,
                    generation,
                },
            ));
            index += 1;
        }
        if index != count {
            panic!("span store: successor chain ends after {index} of {count} spans");
        }

        self.head = (count > 0).then_some(0);
        self.tail = count.checked_sub(1);
        Compaction { remap }
    }

    /// Iterate over `(key, span)` pairs in document order.
    ///
    /// The walk is bounded by the live count; a successor chain longer than that means the
    /// store is corrupt and the iterator panics.
    pub fn iter(&self) -> Iter<'_, F> {
        Iter {
            store: self,
            cursor: self.head,
            remaining: self.len,
        }
    }

    /// All spans in document order, cloned.
    pub fn to_vec(&self) -> Vec<Span<F>>
    where
        F: Clone,
    {
        self.iter().map(|(_, span)| span.clone()).collect()
    }

    fn reset(&mut self) {
        tracing::trace!(capacity = self.slots.len(), "span store emptied, resetting arena");
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    fn allocate(&mut self, span: Span<F>) -> usize {
        let generation = self.bump_generation();
        let node = Some(Node {
            span,
            prev: None,
            next: None,
        });
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Slot { generation, node };
                slot
            }
            None => {
                self.slots.push(Slot { generation, node });
                self.slots.len() - 1
            }
        }
    }

    fn bump_generation(&mut self) -> u64 {
        let generation = self.next_generation;
        self.next_generation += 1;
        generation
    }

    fn resolve(&self, id: SpanId) -> Option<usize> {
        let slot = self.slots.get(id.slot)?;
        (slot.generation == id.generation && slot.node.is_some()).then_some(id.slot)
    }

    fn live_slot(&self, id: SpanId) -> usize {
        match self.resolve(id) {
            Some(slot) => slot,
            None => panic!("span store: stale span id {id:?}"),
        }
    }

    fn id_at(&self, slot: usize) -> SpanId {
        SpanId {
            slot,
            generation: self.slots[slot].generation,
        }
    }

    fn node(&self, slot: usize) -> &Node<F> {
        match &self.slots[slot].node {
            Some(node) => node,
            None => panic!("span store: link to vacant slot {slot}"),
        }
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node<F> {
        match &mut self.slots[slot].node {
            Some(node) => node,
            None => panic!("span store: link to vacant slot {slot}"),
        }
    }
}

impl<F> Default for SpanStore<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F> Index<SpanId> for SpanStore<F> {
    type Output = Span<F>;

    fn index(&self, id: SpanId) -> &Span<F> {
        &self.node(self.live_slot(id)).span
    }
}

impl<F> IndexMut<SpanId> for SpanStore<F> {
    fn index_mut(&mut self, id: SpanId) -> &mut Span<F> {
        let slot = self.live_slot(id);
        &mut self.node_mut(slot).span
    }
}

/// Ordered iterator over the spans of a [`SpanStore`].
pub struct Iter<'a, F> {
    store: &'a SpanStore<F>,
    cursor: Option<usize>,
    remaining: usize,
}

impl<'a, F> Iterator for Iter<'a, F> {
    type Item = (SpanId, &'a Span<F>);

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store;
        let slot = self.cursor?;
        if self.remaining == 0 {
            panic!(
                "span store: broken successor chain (more than {} spans)",
                store.len
            );
        }
        self.remaining -= 1;
        let node = store.node(slot);
        self.cursor = node.next;
        Some((store.id_at(slot), &node.span))
    }
}

impl<'a, F> IntoIterator for &'a SpanStore<F> {
    type Item = (SpanId, &'a Span<F>);
    type IntoIter = Iter<'a, F>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
