//! Member cards for the people page.

use super::{attr, render_into, text};
use crate::error::Result;
use crate::model::{Member, MemberGroups};
use crate::page::{Page, Selector};
use maud::{Markup, PreEscaped, html};

pub const SECTION: &str = "#members";
pub const ALL: &str = "#allmembers";
pub const FACULTY: &str = "#profmembers";
pub const PHD: &str = "#phdmembers";

const PROFILE_ARROW: &str = "images/home/right-arrow-primary.png";

fn detail(class: &str, icon: &str, label: &str, value: &Option<String>) -> Markup {
    html! {
        @if let Some(value) = value {
            p class=(class) {
                i class=(format!("mdi {} text-primary", icon)) {}
                " " (label) ": "
                span { (PreEscaped(value)) }
            }
        }
    }
}

fn card(member: &Member) -> Markup {
    let name = text(&member.name);
    html! {
        div class="member mt-4 p-4" {
            div class="row gy-4 gx-4 gx-xl-5" {
                div class="member-left-col col-12 col-md-4 col-xl-3" {
                    div class="member-image" {
                        @if let Some(image) = &member.image {
                            img src=(attr(image)) alt=(attr(name));
                        }
                    }
                }
                div class="member-right-col col-12 col-md-8 col-xl-9" {
                    div class="member-content d-flex flex-column h-100" {
                        div {
                            h4 class="member-name mb-4" { (PreEscaped(name)) }
                            div class="row mb-4" {
                                div class="col-12 col-md-6" {
                                    p class="member-interest mb-2" {
                                        i class="mdi mdi-test-tube text-primary" {}
                                        " Research Interest:"
                                        @if !member.interests.is_empty() {
                                            ul {
                                                @for interest in &member.interests {
                                                    li { " " (PreEscaped(interest)) }
                                                }
                                            }
                                        }
                                    }
                                    @if let Some(phone) = &member.phone {
                                        p class="member-phone mb-2" {
                                            i class="mdi mdi-phone text-primary" {}
                                            " Phone: "
                                            a href=(attr(&format!("tel:{}", phone))) { (PreEscaped(phone)) }
                                        }
                                    }
                                    @if let Some(email) = &member.email {
                                        p class="member-email mb-2" {
                                            i class="mdi mdi-email text-primary" {}
                                            " Email: "
                                            a href=(attr(&format!("mailto:{}", email))) { (PreEscaped(email)) }
                                        }
                                    }
                                }
                                div class="col-12 col-md-6" {
                                    (detail("member-address mb-2", "mdi-map-marker", "Address", &member.address))
                                    (detail("member-building mb-2", "mdi-office-building", "Building", &member.building))
                                    (detail("member-room mb-2", "mdi-door", "Room", &member.room))
                                }
                            }
                        }
                        div class="mt-auto text-right" {
                            @if let Some(profile) = &member.profile_url {
                                a href=(attr(profile)) class="text-primary border-2 border-primary border-bottom" {
                                    "View Profile "
                                    img src=(PROFILE_ARROW) alt="" class="img-fluid mb-1 ms-2";
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn render_members<'a, I>(members: I) -> String
where
    I: IntoIterator<Item = &'a Member>,
{
    html! {
        @for member in members {
            (card(member))
        }
    }
    .into_string()
}

/// The combined view always renders when present. The per-group views are
/// only touched when their group is an array.
pub fn apply<P: Page + ?Sized>(page: &mut P, groups: &MemberGroups) -> Result<usize> {
    let mut rendered = 0;
    if render_into(page, &Selector::parse(ALL)?, &render_members(groups.combined()))? {
        rendered += 1;
    }
    for (view, group) in [(FACULTY, &groups.faculty), (PHD, &groups.phd)] {
        let Some(group) = group else {
            continue;
        };
        if render_into(page, &Selector::parse(view)?, &render_members(group))? {
            rendered += 1;
        }
    }
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::HtmlPage;

    fn member(name: &str) -> Member {
        Member {
            name: Some(name.to_string()),
            ..Member::default()
        }
    }

    const PAGE: &str = r#"<section id="members">
<div id="allmembers"></div>
<div id="profmembers"><p>prof placeholder</p></div>
<div id="phdmembers"><p>phd placeholder</p></div>
</section>"#;

    #[test]
    fn test_minimal_card() {
        let html = render_members([&member("Ada")]);
        assert!(html.contains(r#"<h4 class="member-name mb-4">Ada</h4>"#));
        assert!(html.contains(r#"<div class="member-image"></div>"#));
        assert!(html.contains(" Research Interest:</p>"));
        assert!(!html.contains("member-phone"));
        assert!(!html.contains("member-room"));
        assert!(!html.contains("View Profile"));
        assert!(html.contains(r#"<div class="mt-auto text-right"></div>"#));
    }

    #[test]
    fn test_full_card() {
        let m = Member {
            image: Some("img/ada.jpg".to_string()),
            interests: vec!["Engines".to_string(), "Looms".to_string()],
            phone: Some("+1 555".to_string()),
            email: Some("ada@example.org".to_string()),
            address: Some("1 Main St".to_string()),
            building: Some("B".to_string()),
            room: Some("101".to_string()),
            profile_url: Some("people/ada.html".to_string()),
            ..member("Ada")
        };
        let html = render_members([&m]);
        assert!(html.contains(r#"<img src="img/ada.jpg" alt="Ada">"#));
        assert!(html.contains("<ul><li> Engines</li><li> Looms</li></ul>"));
        assert!(html.contains(r#"<a href="tel:+1 555">+1 555</a>"#));
        assert!(html.contains(r#"<a href="mailto:ada@example.org">ada@example.org</a>"#));
        assert!(html.contains(r#"<p class="member-room mb-2"><i class="mdi mdi-door text-primary"></i> Room: <span>101</span></p>"#));
        assert!(html.contains(r#"<a href="people/ada.html" class="text-primary border-2 border-primary border-bottom">View Profile "#));
        assert!(html.contains(PROFILE_ARROW));
    }

    #[test]
    fn test_views_follow_groups() {
        let mut page = HtmlPage::parse(PAGE).unwrap();
        let groups = MemberGroups {
            faculty: Some(vec![member("Prof")]),
            phd: None,
        };
        assert_eq!(apply(&mut page, &groups).unwrap(), 2);
        let html = page.as_str();
        assert!(html.contains("phd placeholder"));
        assert!(!html.contains("prof placeholder"));
        assert_eq!(html.matches(">Prof</h4>").count(), 2);
    }

    #[test]
    fn test_combined_order() {
        let mut page = HtmlPage::parse(PAGE).unwrap();
        let groups = MemberGroups {
            faculty: Some(vec![member("F1"), member("F2")]),
            phd: Some(vec![member("P1")]),
        };
        assert_eq!(apply(&mut page, &groups).unwrap(), 3);
        let all = page
            .inner_html(&Selector::parse(ALL).unwrap())
            .unwrap()
            .unwrap();
        let f1 = all.find("F1").unwrap();
        let f2 = all.find("F2").unwrap();
        let p1 = all.find("P1").unwrap();
        assert!(f1 < f2 && f2 < p1);
    }
}
