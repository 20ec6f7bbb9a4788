// Transposition table: fixed-capacity, 4-way buckets, depth-preferred
// replacement with generation aging. Entries carry a plain score; the
// searcher trusts a hit only when the stored depth covers the request.

use crate::board::Move;

#[derive(Clone, Copy, Debug)]
pub struct Entry {
    pub key: u64,
    pub depth: u32,
    pub score: i32,
    pub best: Option<Move>,
    pub gen: u32,
}

const WAYS: usize = 4;

#[derive(Default, Clone, Copy)]
struct Slot(Option<Entry>);

#[derive(Default, Clone)]
struct Bucket {
    slots: [Slot; WAYS],
}

pub struct Tt {
    buckets: Vec<Bucket>,
    gen: u32,
}

impl Default for Tt {
    fn default() -> Self {
        Tt::with_capacity_entries(1 << 16)
    }
}

impl Tt {
    pub fn with_capacity_entries(cap: usize) -> Tt {
        let entries = cap.max(WAYS);
        let buckets = (entries + WAYS - 1) / WAYS;
        Tt { buckets: vec![Bucket::default(); buckets], gen: 0 }
    }

    pub fn with_capacity_mb(mb: usize) -> Tt {
        // Rough 64 bytes per entry.
        let entries = ((mb.saturating_mul(1024) * 1024) / 64).max(WAYS);
        Tt::with_capacity_entries(entries)
    }

    pub fn clear(&mut self) {
        for b in &mut self.buckets {
            *b = Bucket::default();
        }
        self.gen = 0;
    }

    fn bucket_index(&self, key: u64) -> usize {
        let mixed = key ^ (key >> 32);
        (mixed as usize) % self.buckets.len()
    }

    pub fn get(&self, key: u64) -> Option<Entry> {
        let idx = self.bucket_index(key);
        for slot in &self.buckets[idx].slots {
            if let Some(e) = slot.0 {
                if e.key == key {
                    return Some(e);
                }
            }
        }
        None
    }

    pub fn put(&mut self, mut e: Entry) {
        let idx = self.bucket_index(e.key);
        e.gen = self.gen;
        let bucket = &mut self.buckets[idx];

        // Same key: keep the deeper entry.
        for slot in &mut bucket.slots {
            if let Some(cur) = slot.0 {
                if cur.key == e.key {
                    if e.depth >= cur.depth {
                        slot.0 = Some(e);
                    }
                    return;
                }
            }
        }
        // Empty slot first.
        for slot in &mut bucket.slots {
            if slot.0.is_none() {
                slot.0 = Some(e);
                return;
            }
        }
        // Evict lowest depth, oldest generation on ties.
        let mut victim = 0usize;
        let mut best_key = (u32::MAX, u32::MAX);
        for (i, slot) in bucket.slots.iter().enumerate() {
            if let Some(cur) = slot.0 {
                let key = (cur.depth, cur.gen);
                if key < best_key {
                    best_key = key;
                    victim = i;
                }
            }
        }
        bucket.slots[victim].0 = Some(e);
    }

    pub fn len(&self) -> usize {
        self.buckets
            .iter()
            .flat_map(|b| b.slots.iter())
            .filter(|s| s.0.is_some())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bump_generation(&mut self) {
        self.gen = self.gen.wrapping_add(1);
    }
}
