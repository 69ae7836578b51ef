//! Static town table for the location picker: Seoul districts and Gyeonggi
//! cities, each with its neighborhoods.

use carrot_types::api::{AreaEntry, LocationGroups};

const SEOUL_PREFIX: &str = "서울";

pub const METRO_AREAS: &[(&str, &[&str])] = &[
    ("서울 강남구", &["역삼동", "논현동", "압구정동", "청담동", "삼성동", "대치동", "개포동"]),
    ("서울 서초구", &["서초동", "반포동", "잠원동", "방배동", "양재동"]),
    ("서울 송파구", &["잠실동", "석촌동", "삼전동", "가락동", "문정동", "장지동"]),
    ("서울 강동구", &["강일동", "상일동", "명일동", "고덕동", "암사동", "천호동"]),
    ("서울 마포구", &["홍대입구", "합정동", "망원동", "연남동", "성산동", "상암동"]),
    ("서울 용산구", &["이태원동", "한남동", "용산동", "청파동", "원효로동"]),
    ("서울 종로구", &["종로1가", "종로2가", "종로3가", "인사동", "삼청동", "혜화동"]),
    ("서울 중구", &["명동", "충무로", "을지로", "신당동", "동대문"]),
    ("서울 성동구", &["성수동", "왕십리", "금호동", "옥수동", "행당동"]),
    ("서울 광진구", &["건대입구", "구의동", "자양동", "중곡동"]),
    ("서울 동대문구", &["회기동", "휘경동", "이문동", "장안동"]),
    ("서울 성북구", &["성북동", "삼선동", "동선동", "돈암동", "안암동"]),
    ("서울 도봉구", &["쌍문동", "방학동", "창동", "도봉동"]),
    ("서울 노원구", &["노원동", "상계동", "중계동", "하계동", "공릉동"]),
    ("서울 은평구", &["은평구청", "연신내", "불광동", "응암동", "역촌동"]),
    ("서울 서대문구", &["신촌", "홍제동", "북아현동", "충정로"]),
    ("서울 강서구", &["김포공항", "마곡동", "염창동", "등촌동", "화곡동"]),
    ("서울 양천구", &["목동", "신정동", "신월동"]),
    ("서울 영등포구", &["영등포구청", "당산동", "문래동", "양평동", "대림동"]),
    ("서울 구로구", &["구로디지털단지", "신도림", "구로동", "오류동"]),
    ("서울 금천구", &["가산디지털단지", "독산동", "시흥동"]),
    ("서울 관악구", &["신림동", "봉천동", "서원동", "사당동"]),
    ("서울 동작구", &["노량진", "상도동", "사당동", "대방동"]),
    ("서울 강북구", &["수유동", "미아동", "번동"]),
    ("서울 중랑구", &["면목동", "상봉동", "중화동", "묵동"]),
    ("수원시", &["영통구", "장안구", "팔달구", "영통동", "인계동", "매탄동", "원천동", "광교동", "화서동"]),
    ("성남시", &["분당구", "수정구", "중원구", "정자동", "서현동", "야탑동", "이매동", "금곡동", "상대원동"]),
    ("용인시", &["기흥구", "수지구", "처인구", "죽전동", "수지동", "기흥동", "동백동", "보정동", "용인대역"]),
    ("고양시", &["일산동구", "일산서구", "덕양구", "일산동", "일산서", "화정동", "행신동", "대화동", "주엽동"]),
    ("부천시", &["원미구", "소사구", "오정구", "부천역", "상동", "중동", "송내동", "괴안동"]),
    ("안양시", &["만안구", "동안구", "안양역", "평촌동", "범계동", "인덕원", "관양동"]),
    ("안산시", &["단원구", "상록구", "고잔동", "선부동", "원곡동", "본오동", "사동"]),
    ("평택시", &["평택역", "송탄동", "팽성읍", "안중읍", "현덕면", "오성면"]),
    ("시흥시", &["정왕동", "은행동", "대야동", "신천동", "매화동"]),
    ("광명시", &["소하동", "철산동", "하안동", "광명역", "일직동"]),
    ("군포시", &["산본동", "당정동", "부곡동", "금정동"]),
    ("의왕시", &["내손동", "고천동", "청계동", "오전동"]),
    ("과천시", &["갈현동", "별양동", "중앙동", "과천동"]),
    ("구리시", &["갈매동", "인창동", "교문동", "수택동"]),
    ("남양주시", &["다산동", "별내동", "화도읍", "와부읍", "오남읍", "진접읍"]),
    ("하남시", &["신장동", "덕풍동", "창우동", "감북동", "풍산동"]),
    ("김포시", &["사우동", "장기동", "구래동", "감정동", "걸포동"]),
    ("광주시", &["경안동", "송정동", "오포읍", "곤지암읍"]),
    ("이천시", &["증포동", "창전동", "중리동", "부발읍"]),
    ("여주시", &["여주읍", "가남읍", "점동면"]),
    ("오산시", &["오산동", "세교동", "죽미동", "원동"]),
    ("양주시", &["회천동", "광적면", "장흥면"]),
    ("포천시", &["포천동", "소흘읍", "가산면"]),
    ("파주시", &["금촌동", "운정동", "교하읍", "문산읍"]),
    ("연천군", &["연천읍", "전곡읍", "청산면"]),
    ("가평군", &["가평읍", "청평면", "설악면"]),
    ("양평군", &["양평읍", "용문면", "강하면"]),
];

/// Filters the table by a search term. An area whose name matches keeps all
/// of its neighborhoods; otherwise only matching neighborhoods are kept and
/// areas with none are dropped.
pub fn search(term: &str) -> Vec<AreaEntry> {
    let term = term.trim();

    METRO_AREAS
        .iter()
        .filter_map(|(area, towns)| {
            if term.is_empty() {
                return Some(entry(area, towns.iter().copied()));
            }

            let matching: Vec<&str> = towns
                .iter()
                .copied()
                .filter(|town| town.contains(term) || area.contains(term))
                .collect();

            if !matching.is_empty() {
                Some(entry(area, matching.into_iter()))
            } else if area.contains(term) {
                Some(entry(area, towns.iter().copied()))
            } else {
                None
            }
        })
        .collect()
}

/// [`search`] results split into Seoul and Gyeonggi groups.
pub fn grouped(term: &str) -> LocationGroups {
    let (seoul, gyeonggi): (Vec<AreaEntry>, Vec<AreaEntry>) = search(term)
        .into_iter()
        .partition(|entry| entry.area.starts_with(SEOUL_PREFIX));
    LocationGroups { seoul, gyeonggi }
}

/// Area that contains the given neighborhood, if any.
pub fn area_of(town: &str) -> Option<&'static str> {
    METRO_AREAS
        .iter()
        .find(|(_, towns)| towns.contains(&town))
        .map(|(area, _)| *area)
}

fn entry<'a>(area: &str, towns: impl Iterator<Item = &'a str>) -> AreaEntry {
    AreaEntry {
        area: area.to_string(),
        neighborhoods: towns.map(str::to_string).collect(),
    }
}
