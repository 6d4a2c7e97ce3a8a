use crate::error::AllocationError;

/// Alignment of every region handed out by a [`Workspace`].
pub const ARENA_ALIGNMENT: usize = 16;

/// A byte range inside a workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub offset: usize,
    pub len: usize,
}

impl Region {
    pub fn end(&self) -> usize {
        self.offset + self.len
    }

    fn overlaps(&self, other: &Region) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }
}

/// Fixed-capacity scratch memory for one inference call.
///
/// The backing buffer is borrowed from the caller, so the workspace never
/// grows and is released when the caller's buffer goes out of scope. Regions
/// are handed out by bumping a head offset; nothing is freed individually.
#[derive(Debug)]
pub struct Workspace<'a> {
    buf: &'a mut [u8],
    head: usize,
}

impl<'a> Workspace<'a> {
    pub fn new(buf: &'a mut [u8]) -> Workspace<'a> {
        Workspace { buf, head: 0 }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Bytes consumed so far, alignment padding included.
    pub fn used(&self) -> usize {
        self.head
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.head
    }

    /// Reserves `len` zeroed bytes at the next aligned offset.
    pub fn allocate(&mut self, len: usize) -> Result<Region, AllocationError> {
        let available = self.remaining();
        let placed = align_up(self.head, ARENA_ALIGNMENT).and_then(|offset| {
            let requested = align_up(len, ARENA_ALIGNMENT)?.checked_add(offset - self.head)?;
            Some((offset, requested))
        });
        let (offset, requested) = match placed {
            Some((offset, requested)) if requested <= available => (offset, requested),
            Some((_, requested)) => return Err(AllocationError::ArenaExhausted { requested, available }),
            None => return Err(AllocationError::ArenaExhausted { requested: usize::MAX, available }),
        };
        let region = Region { offset, len };
        self.buf[offset..offset + len].fill(0);
        self.head += requested;
        Ok(region)
    }

    pub fn bytes(&self, region: Region) -> &[u8] {
        &self.buf[region.offset..region.end()]
    }

    pub fn bytes_mut(&mut self, region: Region) -> &mut [u8] {
        &mut self.buf[region.offset..region.end()]
    }

    /// Borrows `output` mutably while leaving every other region readable.
    pub fn split_at_output(&mut self, output: Region) -> OutputSplit<'_> {
        let (before, rest) = self.buf.split_at_mut(output.offset);
        let (out, after) = rest.split_at_mut(output.len);
        OutputSplit { before, after, output_region: output, output: out }
    }

    /// Forgets every allocation; the bytes are zeroed again on reuse.
    pub fn reset(&mut self) {
        self.head = 0;
    }
}

/// Disjoint view of a workspace: one writable output plus read access to
/// the bytes on either side of it.
pub struct OutputSplit<'w> {
    before: &'w [u8],
    after: &'w [u8],
    output_region: Region,
    pub output: &'w mut [u8],
}

impl<'w> OutputSplit<'w> {
    /// Returns the bytes of `region`, or `None` if it overlaps the output.
    pub fn read(&self, region: Region) -> Option<&'w [u8]> {
        if region.overlaps(&self.output_region) {
            return None;
        }
        let (before, after): (&'w [u8], &'w [u8]) = (self.before, self.after);
        if region.end() <= self.output_region.offset {
            before.get(region.offset..region.end())
        } else {
            let start = region.offset - self.output_region.end();
            after.get(start..start + region.len)
        }
    }
}

fn align_up(value: usize, align: usize) -> Option<usize> {
    value.checked_next_multiple_of(align)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn regions_are_aligned_and_disjoint() {
        let mut buf = [0u8; 128];
        let mut ws = Workspace::new(&mut buf);
        let a = ws.allocate(2).unwrap();
        let b = ws.allocate(20).unwrap();
        let c = ws.allocate(1).unwrap();
        assert_eq!(a, Region { offset: 0, len: 2 });
        assert_eq!(b, Region { offset: 16, len: 20 });
        assert_eq!(c, Region { offset: 48, len: 1 });
        assert_eq!(ws.used(), 64);
        assert_eq!(ws.remaining(), 64);
    }

    #[test]
    fn exhaustion_reports_sizes_and_keeps_state() {
        let mut buf = [0u8; 40];
        let mut ws = Workspace::new(&mut buf);
        ws.allocate(16).unwrap();
        let err = ws.allocate(30).unwrap_err();
        assert_eq!(err, AllocationError::ArenaExhausted { requested: 32, available: 24 });
        assert_eq!(ws.used(), 16);
    }

    #[test]
    fn oversized_request_is_exhaustion_not_overflow() {
        let mut buf = [0u8; 32];
        let mut ws = Workspace::new(&mut buf);
        ws.allocate(1).unwrap();
        let err = ws.allocate(usize::MAX).unwrap_err();
        assert_eq!(err, AllocationError::ArenaExhausted { requested: usize::MAX, available: 16 });
        assert_eq!(ws.used(), 16);
    }

    #[test]
    fn allocation_zeroes_reused_bytes() {
        let mut buf = [0xAAu8; 32];
        let mut ws = Workspace::new(&mut buf);
        let r = ws.allocate(4).unwrap();
        assert_eq!(ws.bytes(r), &[0, 0, 0, 0]);
        ws.bytes_mut(r).copy_from_slice(&[1, 2, 3, 4]);
        ws.reset();
        let r = ws.allocate(4).unwrap();
        assert_eq!(ws.bytes(r), &[0, 0, 0, 0]);
    }

    #[test]
    fn split_reads_both_sides_of_output() {
        let mut buf = [0u8; 64];
        let mut ws = Workspace::new(&mut buf);
        let a = ws.allocate(2).unwrap();
        let out = ws.allocate(2).unwrap();
        let c = ws.allocate(3).unwrap();
        ws.bytes_mut(a).copy_from_slice(&[7, 8]);
        ws.bytes_mut(c).copy_from_slice(&[1, 2, 3]);

        let split = ws.split_at_output(out);
        assert_eq!(split.read(a), Some(&[7u8, 8][..]));
        assert_eq!(split.read(c), Some(&[1u8, 2, 3][..]));
        assert_eq!(split.read(out), None);
        split.output.copy_from_slice(&[9, 9]);
        assert_eq!(ws.bytes(out), &[9, 9]);
    }
}
