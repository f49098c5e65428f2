/// Physical memory geometry used to turn raw vsize/rss readings into
/// fractions of installed memory. Injectable so tests don't depend on the
/// host's RAM size.
#[derive(Clone, Copy, Debug)]
pub struct MemoryInfo {
    pub page_size: u64,
    pub total_pages: u64,
}

impl MemoryInfo {
    pub fn from_system() -> Self {
        // SAFETY: sysconf takes no pointers and is always safe to call.
        let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
        let total_pages = unsafe { libc::sysconf(libc::_SC_PHYS_PAGES) };
        MemoryInfo {
            page_size: page_size.max(1) as u64,
            total_pages: total_pages.max(1) as u64,
        }
    }

    pub fn total_bytes(&self) -> u64 {
        self.page_size * self.total_pages
    }

    /// Fraction of physical memory covered by a virtual size in bytes.
    pub fn virtual_fraction(&self, vsize_bytes: u64) -> f32 {
        vsize_bytes as f32 / self.total_bytes() as f32
    }

    /// Fraction of physical memory covered by a resident page count.
    pub fn resident_fraction(&self, rss_pages: u64) -> f32 {
        rss_pages as f32 / self.total_pages as f32
    }
}
