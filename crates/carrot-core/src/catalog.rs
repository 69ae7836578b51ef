//! Client-side search, category filter and sort over an already-fetched
//! listing set. Applied in that order: search, then filter, then sort.

use std::cmp::Ordering;

use carrot_types::api::ListingQuery;
use carrot_types::models::Listing;
use serde::{Deserialize, Serialize};

pub const DIGITAL_KEYWORDS: &[&str] = &[
    "폰", "컴퓨터", "노트북", "태블릿", "모니터", "키보드", "마우스", "이어폰", "스피커",
];

pub const FURNITURE_KEYWORDS: &[&str] = &["책상", "의자", "침대", "소파", "장", "수납", "조명", "커튼"];

/// Sort key for a sell listing without a usable price under price-ascending order.
const UNPRICED_SORT_KEY: i64 = 999_999_999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    #[default]
    All,
    Digital,
    Furniture,
    Favorites,
}

impl Category {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "all" => Some(Self::All),
            "digital" => Some(Self::Digital),
            "furniture" => Some(Self::Furniture),
            "favorites" => Some(Self::Favorites),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Digital => "digital",
            Self::Furniture => "furniture",
            Self::Favorites => "favorites",
        }
    }

    /// Title keywords for keyword-based categories.
    pub fn keywords(&self) -> Option<&'static [&'static str]> {
        match self {
            Self::Digital => Some(DIGITAL_KEYWORDS),
            Self::Furniture => Some(FURNITURE_KEYWORDS),
            Self::All | Self::Favorites => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Latest,
    PriceLow,
    PriceHigh,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "latest" => Some(Self::Latest),
            "price_low" => Some(Self::PriceLow),
            "price_high" => Some(Self::PriceHigh),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Latest => "latest",
            Self::PriceLow => "price_low",
            Self::PriceHigh => "price_high",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogQuery {
    pub search: String,
    pub category: Category,
    pub sort: SortOrder,
}

impl CatalogQuery {
    /// Lenient parse: unknown filter or sort values fall back to the defaults.
    pub fn from_params(params: &ListingQuery) -> Self {
        Self {
            search: params.q.clone().unwrap_or_default(),
            category: params
                .filter
                .as_deref()
                .and_then(Category::parse)
                .unwrap_or_default(),
            sort: params.sort.as_deref().and_then(SortOrder::parse).unwrap_or_default(),
        }
    }

    /// Encodes the query back into request parameters.
    pub fn to_params(&self, favorites: &[String]) -> ListingQuery {
        ListingQuery {
            q: (!self.search.trim().is_empty()).then(|| self.search.clone()),
            filter: Some(self.category.as_str().to_string()),
            sort: Some(self.sort.as_str().to_string()),
            ids: (self.category == Category::Favorites).then(|| favorites.join(",")),
        }
    }
}

/// Splits the comma-separated `ids` parameter.
pub fn parse_id_list(ids: Option<&str>) -> Vec<String> {
    ids.map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Runs search, filter and sort. `favorites` is only consulted for
/// [`Category::Favorites`].
pub fn apply<T: AsRef<Listing>>(items: Vec<T>, query: &CatalogQuery, favorites: &[String]) -> Vec<T> {
    let found = search(items, &query.search);
    let mut filtered = filter(found, query.category, favorites);
    sort(&mut filtered, query.sort);
    filtered
}

/// Case-insensitive substring match over title or description. A blank term
/// matches everything.
pub fn search<T: AsRef<Listing>>(items: Vec<T>, term: &str) -> Vec<T> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return items;
    }

    items
        .into_iter()
        .filter(|item| {
            let listing = item.as_ref();
            listing.title.to_lowercase().contains(&term)
                || listing.description.to_lowercase().contains(&term)
        })
        .collect()
}

pub fn filter<T: AsRef<Listing>>(items: Vec<T>, category: Category, favorites: &[String]) -> Vec<T> {
    match category {
        Category::All => items,
        Category::Favorites => items
            .into_iter()
            .filter(|item| {
                let id = item.as_ref().id.to_string();
                favorites.iter().any(|fav| *fav == id)
            })
            .collect(),
        Category::Digital | Category::Furniture => {
            let keywords = category.keywords().unwrap_or_default();
            items
                .into_iter()
                .filter(|item| title_matches(item.as_ref(), keywords))
                .collect()
        }
    }
}

fn title_matches(listing: &Listing, keywords: &[&str]) -> bool {
    let title = listing.title.to_lowercase();
    keywords.iter().any(|kw| title.contains(kw))
}

pub fn sort<T: AsRef<Listing>>(items: &mut [T], order: SortOrder) {
    match order {
        SortOrder::Latest => items.sort_by(|a, b| newest_first(a.as_ref(), b.as_ref())),
        SortOrder::PriceLow => items.sort_by(|a, b| price_low(a.as_ref(), b.as_ref())),
        SortOrder::PriceHigh => items.sort_by(|a, b| price_high(a.as_ref(), b.as_ref())),
    }
}

fn newest_first(a: &Listing, b: &Listing) -> Ordering {
    b.created_at.cmp(&a.created_at)
}

fn ascending_key(listing: &Listing) -> i64 {
    if listing.is_share() {
        0
    } else if listing.price > 0 {
        listing.price
    } else {
        UNPRICED_SORT_KEY
    }
}

fn price_low(a: &Listing, b: &Listing) -> Ordering {
    ascending_key(a)
        .cmp(&ascending_key(b))
        .then_with(|| newest_first(a, b))
}

fn price_high(a: &Listing, b: &Listing) -> Ordering {
    match (a.is_share(), b.is_share()) {
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (true, true) => newest_first(a, b),
        (false, false) => b
            .price
            .max(0)
            .cmp(&a.price.max(0))
            .then_with(|| newest_first(a, b)),
    }
}
