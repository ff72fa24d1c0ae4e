use std::marker::PhantomData;
use std::mem::size_of;

use zerocopy::byteorder::{NativeEndian, U32, U64};
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

use crate::types::errors::MineError;
use crate::types::{Item, ItemIdx, Support};

// Entry flavors. Closed-mode stores keep the header id together with
// the conditional support the element was added at (perfect
// extensions carry support 0); the cross-branch merge replays these.
// The all-itemset modes store finished item values.
pub(crate) type ClosedEntry = U64<NativeEndian>;
pub(crate) type ItemEntry = U32<NativeEndian>;

pub(crate) fn closed_entry(id: ItemIdx, supp: Support) -> ClosedEntry {
    U64::new(u64::from(id) | (u64::from(supp) << 32))
}

pub(crate) fn closed_entry_id(e: ClosedEntry) -> ItemIdx {
    e.get() as u32
}

pub(crate) fn closed_entry_supp(e: ClosedEntry) -> Support {
    (e.get() >> 32) as u32
}

pub(crate) fn item_entry(item: Item) -> ItemEntry {
    U32::new(item)
}

//------------ PatternStore --------------------------------------------------

// Compact per-branch pattern storage: one contiguous byte buffer of
// length-prefixed records, `[len][support][entry * len]`. Readers
// advance record by record; nothing is ever removed. Each top-level
// branch owns one store, so workers never contend on these.
#[derive(Debug, Default)]
pub(crate) struct PatternStore<E> {
    buf: Vec<u8>,
    count: usize,
    _entries: PhantomData<E>,
}

#[derive(
    Clone, Copy, Debug, FromBytes, Immutable, IntoBytes, KnownLayout,
    Unaligned,
)]
#[repr(C)]
struct RecordHeader {
    len: U32<NativeEndian>,
    supp: U32<NativeEndian>,
}

impl<E> PatternStore<E>
where
    E: FromBytes + IntoBytes + Immutable + KnownLayout + Unaligned + Copy,
{
    pub(crate) fn new() -> Self {
        Self {
            buf: Vec::new(),
            count: 0,
            _entries: PhantomData,
        }
    }

    pub(crate) fn push(
        &mut self,
        entries: &[E],
        supp: Support,
    ) -> Result<(), MineError> {
        let need = size_of::<RecordHeader>() + size_of_val(entries);
        if self.buf.len() + need > self.buf.capacity() {
            self.buf
                .try_reserve(need)
                .map_err(|_| MineError::OutOfMemory)?;
        }
        let header = RecordHeader {
            len: U32::new(entries.len() as u32),
            supp: U32::new(supp),
        };
        self.buf.extend_from_slice(header.as_bytes());
        self.buf.extend_from_slice(entries.as_bytes());
        self.count += 1;
        Ok(())
    }

    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn iter(&self) -> Records<'_, E> {
        Records {
            buf: &self.buf,
            _entries: PhantomData,
        }
    }
}

//------------ Records -------------------------------------------------------

// Iterates the records of a store in emission order, yielding the
// entry slice and the itemset support.
#[derive(Debug)]
pub(crate) struct Records<'a, E> {
    buf: &'a [u8],
    _entries: PhantomData<&'a E>,
}

impl<'a, E> Iterator for Records<'a, E>
where
    E: FromBytes + IntoBytes + Immutable + KnownLayout + Unaligned + Copy,
{
    type Item = (&'a [E], Support);

    fn next(&mut self) -> Option<Self::Item> {
        if self.buf.len() < size_of::<RecordHeader>() {
            return None;
        }
        let (header, rest) =
            self.buf.split_at(size_of::<RecordHeader>());
        let header = RecordHeader::read_from_bytes(header).ok()?;
        let bytes = header.len.get() as usize * size_of::<E>();
        if rest.len() < bytes {
            return None;
        }
        let (entries, rest) = rest.split_at(bytes);
        let entries = <[E]>::ref_from_bytes(entries).ok()?;
        self.buf = rest;
        Some((entries, header.supp.get()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_come_back_in_order() {
        let mut store = PatternStore::<ItemEntry>::new();
        store
            .push(&[U32::new(7), U32::new(3)], 5)
            .unwrap();
        store.push(&[], 9).unwrap();
        store.push(&[U32::new(1)], 2).unwrap();
        assert_eq!(store.count(), 3);

        let got: Vec<(Vec<u32>, Support)> = store
            .iter()
            .map(|(e, s)| (e.iter().map(|v| v.get()).collect(), s))
            .collect();
        assert_eq!(
            got,
            vec![(vec![7, 3], 5), (vec![], 9), (vec![1], 2)]
        );
    }

    #[test]
    fn closed_entries_carry_element_support() {
        let e = closed_entry(3, 1200);
        assert_eq!(closed_entry_id(e), 3);
        assert_eq!(closed_entry_supp(e), 1200);

        let mut store = PatternStore::<ClosedEntry>::new();
        store.push(&[e, closed_entry(0, 0)], 1200).unwrap();
        let (entries, supp) = store.iter().next().unwrap();
        assert_eq!(supp, 1200);
        assert_eq!(closed_entry_supp(entries[1]), 0);
    }
}
