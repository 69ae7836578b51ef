use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use carrot_types::models::{CommentAuthor, Listing, Seller, User};

use crate::locations;
use crate::messages::{
    DEFAULT_LOCATION, JUST_NOW, PRICE_NEGOTIABLE, SELLER_PREFIX, SHARE_LABEL, UNKNOWN_LOCATION,
    UNKNOWN_NICKNAME,
};

/// Price label for a listing card: giveaway, formatted won amount, or
/// "negotiable" when no price is set.
pub fn format_price(listing: &Listing) -> String {
    if listing.is_share() {
        return SHARE_LABEL.to_string();
    }
    if listing.price > 0 {
        format!("{}원", group_thousands(listing.price))
    } else {
        PRICE_NEGOTIABLE.to_string()
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if value < 0 { format!("-{}", out) } else { out }
}

pub fn format_relative_time(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    if secs < 60 {
        JUST_NOW.to_string()
    } else if secs < 3_600 {
        format!("{}분 전", secs / 60)
    } else if secs < 86_400 {
        format!("{}시간 전", secs / 3_600)
    } else {
        format!("{}월 {}일", at.month(), at.day())
    }
}

/// "성남시 정자동" for a known neighborhood, the raw value otherwise.
pub fn location_label(town: &str) -> String {
    match locations::area_of(town) {
        Some(area) => format!("{} {}", area, town),
        None => town.to_string(),
    }
}

/// Seller shown on listing cards. A missing user row gets a placeholder
/// derived from the owner id.
pub fn seller_summary(user: Option<&User>, owner_id: &Uuid) -> Seller {
    match user {
        Some(user) => seller_from(user),
        None => {
            let short: String = owner_id.to_string().chars().take(4).collect();
            Seller {
                id: Some(*owner_id),
                nickname: format!("{}{}", SELLER_PREFIX, short),
                avatar_url: None,
                location: DEFAULT_LOCATION.to_string(),
                rating: 5.0,
                trade_count: 0,
            }
        }
    }
}

/// Seller shown on the listing detail view.
pub fn seller_detail(user: Option<&User>) -> Seller {
    match user {
        Some(user) => seller_from(user),
        None => Seller {
            id: None,
            nickname: UNKNOWN_NICKNAME.to_string(),
            avatar_url: None,
            location: UNKNOWN_LOCATION.to_string(),
            rating: 0.0,
            trade_count: 0,
        },
    }
}

/// Author block for a comment; unknown authors keep their id.
pub fn comment_author(user: Option<&User>, author_id: Uuid) -> CommentAuthor {
    match user {
        Some(user) => CommentAuthor {
            id: user.id,
            nickname: user.nickname.clone(),
            avatar_url: user.avatar_url.clone(),
        },
        None => CommentAuthor {
            id: author_id,
            nickname: UNKNOWN_NICKNAME.to_string(),
            avatar_url: None,
        },
    }
}

fn seller_from(user: &User) -> Seller {
    Seller {
        id: Some(user.id),
        nickname: user.nickname.clone(),
        avatar_url: user.avatar_url.clone(),
        location: user.location.clone(),
        rating: user.rating,
        trade_count: user.trade_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carrot_types::models::TradeType;
    use chrono::{Duration, TimeZone};

    fn listing(price: i64, trade_type: TradeType) -> Listing {
        Listing {
            id: Uuid::new_v4(),
            title: "t".into(),
            description: "d".into(),
            price,
            trade_type,
            image: "/iphone.jpg".into(),
            user_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn price_labels() {
        assert_eq!(format_price(&listing(1_234_567, TradeType::Sell)), "1,234,567원");
        assert_eq!(format_price(&listing(500, TradeType::Sell)), "500원");
        assert_eq!(format_price(&listing(0, TradeType::Sell)), "가격 협의");
        assert_eq!(format_price(&listing(0, TradeType::Share)), "나눔");
    }

    #[test]
    fn relative_times() {
        let now = Utc.with_ymd_and_hms(2026, 5, 20, 12, 0, 0).unwrap();
        assert_eq!(format_relative_time(now - Duration::seconds(30), now), "방금 전");
        assert_eq!(format_relative_time(now + Duration::seconds(30), now), "방금 전");
        assert_eq!(format_relative_time(now - Duration::minutes(5), now), "5분 전");
        assert_eq!(format_relative_time(now - Duration::hours(3), now), "3시간 전");
        assert_eq!(format_relative_time(now - Duration::days(2), now), "5월 18일");
    }

    #[test]
    fn missing_comment_author_falls_back_to_unknown() {
        let id = Uuid::new_v4();
        let author = comment_author(None, id);
        assert_eq!(author.id, id);
        assert_eq!(author.nickname, UNKNOWN_NICKNAME);
        assert!(author.avatar_url.is_none());
    }

    #[test]
    fn missing_seller_placeholders() {
        let owner: Uuid = "abcd1234-0000-0000-0000-000000000000".parse().unwrap();
        let card = seller_summary(None, &owner);
        assert_eq!(card.nickname, "판매자abcd");
        assert_eq!(card.location, "함정동");
        assert_eq!(card.rating, 5.0);

        let detail = seller_detail(None);
        assert_eq!(detail.nickname, "알 수 없음");
        assert_eq!(detail.location, "위치 정보 없음");
        assert_eq!(detail.rating, 0.0);
    }

    #[test]
    fn location_label_prefixes_known_area() {
        assert_eq!(location_label("정자동"), "성남시 정자동");
        assert_eq!(location_label("함정동"), "함정동");
    }
}
