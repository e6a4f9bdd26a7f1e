use crate::Element;
use alloc::alloc::{alloc_zeroed, dealloc, handle_alloc_error, realloc, Layout};
use core::ptr::{self, NonNull};
use rawpointer::PointerExt;

#[cold]
pub(crate) fn capacity_overflow() -> ! {
    panic!("capacity overflow");
}

#[cold]
fn out_of_memory(layout: Layout) -> ! {
    log::error!(
        "failed to allocate {} bytes for buffer storage, aborting",
        layout.size()
    );
    handle_alloc_error(layout)
}

#[inline]
fn layout_for<P>(capacity: usize) -> Layout {
    match Layout::array::<P>(capacity) {
        Ok(layout) => layout,
        Err(_) => capacity_overflow(),
    }
}

pub(crate) struct SetLenOnDrop<'a> {
    len: &'a mut usize,
    local_len: usize,
}

impl<'a> SetLenOnDrop<'a> {
    #[inline]
    pub(crate) fn new(len: &'a mut usize) -> Self {
        SetLenOnDrop {
            local_len: *len,
            len,
        }
    }

    #[inline]
    pub(crate) fn increment_len(&mut self, increment: usize) {
        self.local_len += increment;
    }
}

impl Drop for SetLenOnDrop<'_> {
    #[inline]
    fn drop(&mut self) {
        *self.len = self.local_len;
    }
}

/// Owned, zero-initialised storage of `cap` slots of which the first `len`
/// are logically populated.
///
/// Every slot in `[0, cap)` always holds a valid `P`: fresh allocations come
/// from `alloc_zeroed` and growth zero-fills the exposed tail, which is sound
/// because `Element` guarantees the zero bit pattern is a value.
pub(crate) struct RawBuf<P: Element> {
    ptr: NonNull<P>,
    len: usize,
    cap: usize,
}

// The allocation is uniquely owned.
unsafe impl<P: Element + Send> Send for RawBuf<P> {}
unsafe impl<P: Element + Sync> Sync for RawBuf<P> {}

impl<P: Element> RawBuf<P> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        if capacity == 0 {
            return Self {
                ptr: NonNull::<P>::dangling(),
                len: 0,
                cap: 0,
            };
        }
        let layout = layout_for::<P>(capacity);
        // Element types are never zero-sized, so the layout is non-empty.
        let ptr = unsafe { alloc_zeroed(layout) } as *mut P;
        let ptr = match NonNull::new(ptr) {
            Some(ptr) => ptr,
            None => out_of_memory(layout),
        };
        Self {
            ptr,
            len: 0,
            cap: capacity,
        }
    }

    /// Reallocates to `new_cap` slots, keeping `[0, len)` and zeroing
    /// `[len, new_cap)`.
    pub(crate) fn grow_to(&mut self, new_cap: usize) {
        debug_assert!(new_cap > self.cap);
        let new_layout = layout_for::<P>(new_cap);
        let raw = if self.cap == 0 {
            unsafe { alloc_zeroed(new_layout) }
        } else {
            let old_layout = layout_for::<P>(self.cap);
            unsafe { realloc(self.ptr.as_ptr() as *mut u8, old_layout, new_layout.size()) }
        };
        let ptr = match NonNull::new(raw as *mut P) {
            Some(ptr) => ptr,
            None => {
                // realloc left the old block in place; give it back first.
                self.release();
                out_of_memory(new_layout)
            }
        };
        self.ptr = ptr;
        self.cap = new_cap;
        unsafe {
            ptr::write_bytes(self.ptr.as_ptr().add(self.len), 0, self.cap - self.len);
        }
    }

    fn release(&mut self) {
        if self.cap != 0 {
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout_for::<P>(self.cap)) };
        }
        self.ptr = NonNull::<P>::dangling();
        self.len = 0;
        self.cap = 0;
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn cap(&self) -> usize {
        self.cap
    }

    #[inline]
    pub(crate) fn set_len(&mut self, len: usize) {
        debug_assert!(len <= self.cap);
        self.len = len;
    }

    pub(crate) fn as_ptr(&self) -> *const P {
        self.ptr.as_ptr()
    }

    pub(crate) fn as_slice(&self) -> &[P] {
        unsafe { std::slice::from_raw_parts(self.as_ptr(), self.len) }
    }

    pub(crate) fn as_slice_mut(&mut self) -> &mut [P] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }

    pub(crate) fn allocated(&self) -> &[P] {
        unsafe { std::slice::from_raw_parts(self.as_ptr(), self.cap) }
    }

    pub(crate) fn allocated_mut(&mut self) -> &mut [P] {
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.cap) }
    }

    /// Populated prefix as raw bytes. `Element` types carry no padding.
    pub(crate) fn as_bytes(&self) -> &[u8] {
        unsafe {
            std::slice::from_raw_parts(
                self.as_ptr() as *const u8,
                self.len * core::mem::size_of::<P>(),
            )
        }
    }

    /// Copies `src` into the slots starting at `index`. Does not touch `len`.
    pub(crate) fn copy_from(&mut self, index: usize, src: &[P]) {
        assert!(index + src.len() <= self.cap);
        unsafe {
            ptr::copy_nonoverlapping(src.as_ptr(), self.ptr.as_ptr().add(index), src.len());
        }
    }

    /// Writes `n` copies of `elem` after the populated prefix.
    pub(crate) fn fill(&mut self, elem: P, n: usize) {
        assert!(self.len + n <= self.cap);
        unsafe {
            let mut ptr = self.ptr.as_ptr().add(self.len);
            let mut local_len = SetLenOnDrop::new(&mut self.len);
            for _ in 0..n {
                ptr::write(ptr.post_inc(), elem);
                local_len.increment_len(1);
            }
            // len set by scope guard
        }
    }
}

impl<P: Element> Drop for RawBuf<P> {
    fn drop(&mut self) {
        self.release();
    }
}
