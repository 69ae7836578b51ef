// User-facing strings (Korean locale).

pub const LOGIN_REQUIRED: &str = "로그인이 필요합니다.";
pub const INVALID_CREDENTIALS: &str = "이메일 또는 비밀번호가 올바르지 않습니다.";
pub const LOGIN_FAILED: &str = "로그인 중 오류가 발생했습니다.";
pub const SIGNUP_FAILED: &str = "회원가입 중 오류가 발생했습니다.";
pub const EMAIL_TAKEN: &str = "이미 존재하는 이메일입니다.";
pub const NICKNAME_TAKEN: &str = "이미 존재하는 닉네임입니다.";
pub const USER_NOT_FOUND: &str = "사용자를 찾을 수 없습니다.";
pub const PROFILE_UPDATE_FAILED: &str = "프로필 업데이트 중 오류가 발생했습니다.";

pub const LISTING_NOT_FOUND: &str = "상품을 찾을 수 없습니다.";
pub const LISTING_NOT_OWNED: &str = "상품을 찾을 수 없거나 수정 권한이 없습니다.";
pub const LISTINGS_UNAVAILABLE: &str = "상품을 불러올 수 없습니다.";

pub const COMMENT_LISTING_MISSING: &str = "존재하지 않는 상품입니다.";
pub const COMMENT_NOT_FOUND: &str = "댓글을 찾을 수 없거나 권한이 없습니다.";
pub const COMMENTS_UNAVAILABLE: &str = "댓글을 불러오는 중 오류가 발생했습니다.";

pub const UNEXPECTED: &str = "예상치 못한 오류가 발생했습니다.";
pub const BAD_REQUEST: &str = "잘못된 요청입니다.";

// Display fallbacks.

pub const UNKNOWN_NICKNAME: &str = "알 수 없음";
pub const UNKNOWN_LOCATION: &str = "위치 정보 없음";
pub const DEFAULT_LOCATION: &str = "함정동";
pub const SELLER_PREFIX: &str = "판매자";
pub const PRICE_NEGOTIABLE: &str = "가격 협의";
pub const SHARE_LABEL: &str = "나눔";
pub const JUST_NOW: &str = "방금 전";
