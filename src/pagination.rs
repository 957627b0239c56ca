//! This modules defines the common functionality for paging data.

use maud::{Markup, html};

/// The config for pagination
#[derive(Debug, Clone)]
pub struct PaginationConfig {
    /// The page number to default to when not specified in a request.
    pub default_page: u64,
    /// The maximum expenses to display per page when not specified in a request.
    pub default_page_size: u64,
    /// The maximum number of pages to show in the pagination indicator.
    pub max_pages: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_page_size: 10,
            max_pages: 5,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum PaginationIndicator {
    Page(u64),
    CurrPage(u64),
    Ellipsis,
    NextButton(u64),
    BackButton(u64),
}

pub fn create_pagination_indicators(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
) -> Vec<PaginationIndicator> {
    let map_page = |page| {
        if page == curr_page {
            PaginationIndicator::CurrPage(page)
        } else {
            PaginationIndicator::Page(page)
        }
    };

    let mut indicators: Vec<PaginationIndicator> = if page_count <= max_pages {
        (1..=page_count).map(map_page).collect()
    } else if curr_page <= (max_pages / 2) {
        (1..=max_pages).map(map_page).collect()
    } else if curr_page > (page_count - max_pages / 2) {
        ((page_count - max_pages + 1)..=page_count)
            .map(map_page)
            .collect()
    } else {
        ((curr_page - max_pages / 2)..=(curr_page + max_pages / 2))
            .map(map_page)
            .collect()
    };

    if page_count > max_pages {
        if curr_page > (max_pages / 2) + 1 {
            indicators.insert(0, PaginationIndicator::Page(1));
            indicators.insert(1, PaginationIndicator::Ellipsis);
        }

        if curr_page < (page_count - max_pages / 2) {
            indicators.push(PaginationIndicator::Ellipsis);
            indicators.push(PaginationIndicator::Page(page_count));
        }
    }

    if curr_page > 1 {
        indicators.insert(0, PaginationIndicator::BackButton(curr_page - 1));
    }

    if curr_page < page_count {
        indicators.push(PaginationIndicator::NextButton(curr_page + 1));
    }

    indicators
}

/// The number of pages needed to show `item_count` items, at least one.
pub fn page_count(item_count: usize, page_size: u64) -> u64 {
    let page_size = page_size.max(1);

    (item_count as u64).div_ceil(page_size).max(1)
}

/// Clamp `page` to `1..=page_count` and return the index range of the items
/// on that page.
pub fn page_bounds(page: u64, page_size: u64, item_count: usize) -> (u64, std::ops::Range<usize>) {
    let page_size = page_size.max(1);
    let page = page.clamp(1, page_count(item_count, page_size));
    let start = ((page - 1) * page_size) as usize;
    let end = (start + page_size as usize).min(item_count);

    (page, start.min(item_count)..end)
}

/// Render the page navigation.
///
/// Small screens get "Сторінка X з Y" between back and next links, larger
/// screens get the full list of page indicators. `page_url` maps a page
/// number to the link for that page.
pub fn pagination_view(
    curr_page: u64,
    page_count: u64,
    max_pages: u64,
    page_url: impl Fn(u64) -> String,
) -> Markup {
    let indicators = create_pagination_indicators(curr_page, page_count, max_pages);
    let back_url = (curr_page > 1).then(|| page_url(curr_page - 1));
    let next_url = (curr_page < page_count).then(|| page_url(curr_page + 1));

    html! {
        nav class="pagination flex justify-center" aria-label="Сторінки"
        {
            ul class="pagination flex items-center justify-between w-full px-2 py-2 lg:hidden"
            {
                li class="flex items-center justify-start"
                {
                    @if let Some(ref href) = back_url {
                        a
                            href=(href)
                            role="button"
                            class="inline-flex items-center rounded px-2 py-1 text-sm text-blue-600 hover:underline"
                        { "Назад" }
                    } @else {
                        span class="inline-flex items-center rounded px-2 py-1 text-sm text-gray-400 dark:text-gray-500"
                        { "Назад" }
                    }
                }

                li class="flex-1 text-center font-semibold text-gray-900 dark:text-white px-2"
                {
                    span aria-current="page" { "Сторінка " (curr_page) " з " (page_count) }
                }

                li class="flex items-center justify-end"
                {
                    @if let Some(ref href) = next_url {
                        a
                            href=(href)
                            role="button"
                            class="inline-flex items-center rounded px-2 py-1 text-sm text-blue-600 hover:underline"
                        { "Вперед" }
                    } @else {
                        span class="inline-flex items-center rounded px-2 py-1 text-sm text-gray-400 dark:text-gray-500"
                        { "Вперед" }
                    }
                }
            }

            ul class="pagination hidden lg:flex items-center gap-x-2 p-0 m-0"
            {
                @for indicator in indicators {
                    li {
                        @match indicator {
                            PaginationIndicator::CurrPage(page) => {
                                span
                                    aria-current="page"
                                    class="block px-3 py-2 rounded-sm font-bold text-black dark:text-white"
                                { (page) }
                            }
                            PaginationIndicator::Page(page) => {
                                a
                                    href=(page_url(page))
                                    class="block px-3 py-2 rounded-sm text-blue-600 hover:underline"
                                { (page) }
                            }
                            PaginationIndicator::Ellipsis => {
                                span class="px-3 py-2 text-gray-500" { "..." }
                            }
                            PaginationIndicator::BackButton(page) => {
                                a
                                    href=(page_url(page))
                                    role="button"
                                    class="block px-3 py-2 rounded-sm text-blue-600 hover:underline"
                                { "Назад" }
                            }
                            PaginationIndicator::NextButton(page) => {
                                a
                                    href=(page_url(page))
                                    role="button"
                                    class="block px-3 py-2 rounded-sm text-blue-600 hover:underline"
                                { "Вперед" }
                            }
                        }
                    }
                }
            }

            p class="hidden lg:block ml-4 py-2 text-sm text-gray-600 dark:text-gray-400"
            {
                "Сторінка " (curr_page) " з " (page_count)
            }
        }
    }
}
