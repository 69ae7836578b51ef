use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use carrot_core::display;
use carrot_types::models::ListingWithSeller;

/// A listing as shown in the browse grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListingCard {
    pub id: Uuid,
    pub title: String,
    pub image: String,
    pub price: String,
    pub location: String,
    pub posted: String,
    pub seller: String,
    pub favorite: bool,
}

impl ListingCard {
    pub fn new(item: &ListingWithSeller, favorite: bool, now: DateTime<Utc>) -> Self {
        let listing = &item.listing;
        Self {
            id: listing.id,
            title: listing.title.clone(),
            image: listing.image.clone(),
            price: display::format_price(listing),
            location: display::location_label(&item.seller.location),
            posted: display::format_relative_time(listing.created_at, now),
            seller: item.seller.nickname.clone(),
            favorite,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrot_types::models::{Listing, Seller, TradeType};
    use chrono::Duration;

    #[test]
    fn card_labels() {
        let now = Utc::now();
        let item = ListingWithSeller {
            listing: Listing {
                id: Uuid::new_v4(),
                title: "의자".into(),
                description: "가져가세요".into(),
                price: 0,
                trade_type: TradeType::Share,
                image: "/iphone.jpg".into(),
                user_id: Uuid::new_v4(),
                created_at: now - Duration::minutes(3),
            },
            seller: Seller {
                id: None,
                nickname: "판매자abcd".into(),
                avatar_url: None,
                location: "정자동".into(),
                rating: 5.0,
                trade_count: 0,
            },
        };

        let card = ListingCard::new(&item, true, now);
        assert_eq!(card.price, "나눔");
        assert_eq!(card.location, "성남시 정자동");
        assert_eq!(card.posted, "3분 전");
        assert!(card.favorite);
    }
}
