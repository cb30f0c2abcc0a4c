const MAX_PAGES_SHOWN: u32 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageLink {
    Page { number: u32, current: bool },
    Ellipsis,
}

/// Previous/next state, the "showing X to Y of Z" range and the numbered
/// links of a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaginationWindow {
    pub current: u32,
    pub page_count: u32,
    pub total: u64,
    pub start_item: u64,
    pub end_item: u64,
    pub has_previous: bool,
    pub has_next: bool,
    pub pages: Vec<PageLink>,
}

impl PaginationWindow {
    pub fn new(current: u32, page_count: u32, total: u64, page_size: u32) -> Self {
        let current = current.max(1);
        let size = u64::from(page_size.max(1));
        let start_item = if total > 0 { u64::from(current - 1) * size + 1 } else { 0 };
        let end_item = (u64::from(current) * size).min(total);

        Self {
            current,
            page_count,
            total,
            start_item,
            end_item,
            has_previous: current > 1,
            has_next: current < page_count,
            pages: page_links(current, page_count),
        }
    }
}

fn page_links(current: u32, page_count: u32) -> Vec<PageLink> {
    let half = MAX_PAGES_SHOWN / 2;
    let mut start = current.saturating_sub(half).max(1);
    let mut end = current.saturating_add(half).min(page_count);
    if current <= half {
        end = page_count.min(MAX_PAGES_SHOWN);
    }
    if current.saturating_add(half) > page_count {
        start = page_count.saturating_sub(MAX_PAGES_SHOWN - 1).max(1);
    }

    let mut links = Vec::new();
    if start > 1 {
        links.push(PageLink::Page { number: 1, current: false });
        if start > 2 {
            links.push(PageLink::Ellipsis);
        }
    }
    for number in start..=end {
        links.push(PageLink::Page {
            number,
            current: number == current,
        });
    }
    if end < page_count {
        if end + 1 < page_count {
            links.push(PageLink::Ellipsis);
        }
        links.push(PageLink::Page {
            number: page_count,
            current: false,
        });
    }
    links
}
