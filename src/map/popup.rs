use crate::domain::NormalizedListing;
use maud::{html, Markup};

/// At least one decimal place: 7 renders as "7.0", 32.15 stays "32.15".
fn decimal(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

/// Popup body for one listing: labelled fields, a link to the detail page and
/// the building photo when there is one.
pub fn popup_content(listing: &NormalizedListing) -> Markup {
    html! {
        b { "名称:" } " " (listing.name) br;
        b { "住所:" } " " (listing.address) br;
        b { "賃料:" } " " (decimal(listing.rent)) "万円" br;
        b { "間取り:" } " " (listing.layout) br;
        b { "面積:" } " " (decimal(listing.area)) "㎡" br;
        b { "築年数:" } " " (listing.building_age.trunc() as i64) "年" br;
        b { "リンク:" } " "
        a href=(listing.detail_url) target="_blank" rel="noopener" { (listing.detail_url) }
        @if let Some(src) = &listing.image_url {
            br;
            img src=(src) style="max-width:200px;";
        }
    }
}
