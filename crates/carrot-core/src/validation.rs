use carrot_types::api::{ListingForm, SignupRequest, UpdateProfileRequest};
use carrot_types::models::{TradeType, User};
use thiserror::Error;

pub const MIN_PASSWORD_CHARS: usize = 6;
pub const MIN_NICKNAME_CHARS: usize = 2;
pub const MAX_IMAGES: usize = 10;
pub const DEFAULT_IMAGE: &str = "/iphone.jpg";

/// Form-level rejection. The display string is shown to the user as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("올바른 이메일을 입력해주세요.")]
    InvalidEmail,
    #[error("비밀번호가 일치하지 않습니다.")]
    PasswordMismatch,
    #[error("비밀번호는 6자 이상이어야 합니다.")]
    PasswordTooShort,
    #[error("닉네임은 2자 이상이어야 합니다.")]
    NicknameTooShort,
    #[error("동네를 선택해주세요.")]
    LocationMissing,
    #[error("변경된 내용이 없습니다.")]
    NoChanges,
    #[error("제목과 설명을 입력해주세요.")]
    TitleOrDescriptionMissing,
    #[error("올바른 가격을 입력해주세요.")]
    InvalidPrice,
    #[error("최대 10장까지 업로드 가능합니다.")]
    TooManyImages,
    #[error("댓글 내용을 입력해주세요.")]
    EmptyComment,
}

pub fn validate_signup(req: &SignupRequest) -> Result<(), ValidationError> {
    let email = req.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    if req.password != req.confirm_password {
        return Err(ValidationError::PasswordMismatch);
    }
    if req.password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }
    if req.nickname.trim().chars().count() < MIN_NICKNAME_CHARS {
        return Err(ValidationError::NicknameTooShort);
    }
    if req.location.trim().is_empty() {
        return Err(ValidationError::LocationMissing);
    }
    Ok(())
}

/// Normalized profile columns ready to be written.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub nickname: String,
    pub location: String,
    pub avatar_url: Option<String>,
}

/// Validates a profile edit against the current row. An edit that changes
/// nothing is rejected.
pub fn validate_profile(
    req: &UpdateProfileRequest,
    current: &User,
) -> Result<ProfileUpdate, ValidationError> {
    let nickname = req.nickname.trim();
    if nickname.chars().count() < MIN_NICKNAME_CHARS {
        return Err(ValidationError::NicknameTooShort);
    }

    let location = req.location.trim();
    if location.is_empty() {
        return Err(ValidationError::LocationMissing);
    }

    let avatar_url = req
        .avatar_url
        .as_deref()
        .map(str::trim)
        .filter(|url| !url.is_empty())
        .map(str::to_string);

    let unchanged = nickname == current.nickname
        && location == current.location
        && avatar_url == current.avatar_url;
    if unchanged {
        return Err(ValidationError::NoChanges);
    }

    Ok(ProfileUpdate {
        nickname: nickname.to_string(),
        location: location.to_string(),
        avatar_url,
    })
}

/// Listing columns derived from a sell / edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidListing {
    pub title: String,
    pub description: String,
    pub price: i64,
    pub trade_type: TradeType,
    pub image: String,
}

pub fn validate_listing(form: &ListingForm) -> Result<ValidListing, ValidationError> {
    if form.title.trim().is_empty() || form.description.trim().is_empty() {
        return Err(ValidationError::TitleOrDescriptionMissing);
    }
    if form.images.len() > MAX_IMAGES {
        return Err(ValidationError::TooManyImages);
    }

    let price = match form.trade_type {
        TradeType::Share => 0,
        TradeType::Sell => match form.price {
            Some(price) if price > 0 => price,
            _ => return Err(ValidationError::InvalidPrice),
        },
    };

    let image = form
        .images
        .first()
        .filter(|img| !img.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| DEFAULT_IMAGE.to_string());

    Ok(ValidListing {
        title: form.title.clone(),
        description: form.description.clone(),
        price,
        trade_type: form.trade_type,
        image,
    })
}

/// Returns the trimmed comment body.
pub fn validate_comment(content: &str) -> Result<String, ValidationError> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyComment);
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn signup() -> SignupRequest {
        SignupRequest {
            email: "carrot@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            nickname: "당근이".into(),
            location: "역삼동".into(),
        }
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "carrot@example.com".into(),
            nickname: "당근이".into(),
            location: "역삼동".into(),
            avatar_url: None,
            rating: 5.0,
            trade_count: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn signup_rules_apply_in_order() {
        assert_eq!(validate_signup(&signup()), Ok(()));

        let mut req = signup();
        req.confirm_password = "different".into();
        req.nickname = "a".into();
        assert_eq!(validate_signup(&req), Err(ValidationError::PasswordMismatch));

        let mut req = signup();
        req.password = "12345".into();
        req.confirm_password = "12345".into();
        assert_eq!(validate_signup(&req), Err(ValidationError::PasswordTooShort));

        let mut req = signup();
        req.nickname = "당".into();
        assert_eq!(validate_signup(&req), Err(ValidationError::NicknameTooShort));

        let mut req = signup();
        req.location = "  ".into();
        assert_eq!(validate_signup(&req), Err(ValidationError::LocationMissing));

        let mut req = signup();
        req.email = "not-an-email".into();
        assert_eq!(validate_signup(&req), Err(ValidationError::InvalidEmail));
    }

    #[test]
    fn korean_nickname_counts_characters_not_bytes() {
        let mut req = signup();
        req.nickname = "당근".into();
        assert_eq!(validate_signup(&req), Ok(()));
    }

    #[test]
    fn profile_edit_without_changes_is_rejected() {
        let current = user();
        let req = UpdateProfileRequest {
            nickname: " 당근이 ".into(),
            location: "역삼동".into(),
            avatar_url: Some("".into()),
        };
        assert_eq!(validate_profile(&req, &current), Err(ValidationError::NoChanges));
    }

    #[test]
    fn profile_edit_normalizes_fields() {
        let current = user();
        let req = UpdateProfileRequest {
            nickname: " 새당근 ".into(),
            location: "논현동".into(),
            avatar_url: Some("   ".into()),
        };
        let update = validate_profile(&req, &current).unwrap();
        assert_eq!(update.nickname, "새당근");
        assert_eq!(update.location, "논현동");
        assert_eq!(update.avatar_url, None);
    }

    #[test]
    fn share_listing_is_forced_to_zero() {
        let form = ListingForm {
            title: "책상 나눔".into(),
            description: "가져가세요".into(),
            price: Some(50_000),
            trade_type: TradeType::Share,
            images: vec![],
        };
        let listing = validate_listing(&form).unwrap();
        assert_eq!(listing.price, 0);
        assert_eq!(listing.image, DEFAULT_IMAGE);
    }

    #[test]
    fn sell_listing_needs_positive_price() {
        let mut form = ListingForm {
            title: "의자".into(),
            description: "상태 좋아요".into(),
            price: None,
            trade_type: TradeType::Sell,
            images: vec!["https://img.example/1.jpg".into(), "https://img.example/2.jpg".into()],
        };
        assert_eq!(validate_listing(&form), Err(ValidationError::InvalidPrice));

        form.price = Some(0);
        assert_eq!(validate_listing(&form), Err(ValidationError::InvalidPrice));

        form.price = Some(12_000);
        let listing = validate_listing(&form).unwrap();
        assert_eq!(listing.price, 12_000);
        assert_eq!(listing.image, "https://img.example/1.jpg");
    }

    #[test]
    fn listing_limits() {
        let form = ListingForm {
            title: " ".into(),
            description: "x".into(),
            price: Some(1),
            ..Default::default()
        };
        assert_eq!(validate_listing(&form), Err(ValidationError::TitleOrDescriptionMissing));

        let form = ListingForm {
            title: "a".into(),
            description: "b".into(),
            price: Some(1),
            images: vec!["img".into(); MAX_IMAGES + 1],
            ..Default::default()
        };
        assert_eq!(validate_listing(&form), Err(ValidationError::TooManyImages));
    }

    #[test]
    fn comment_is_trimmed() {
        assert_eq!(validate_comment("  안녕하세요 \n").unwrap(), "안녕하세요");
        assert_eq!(validate_comment("   "), Err(ValidationError::EmptyComment));
    }
}
