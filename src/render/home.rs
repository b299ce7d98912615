//! Home page sections: featured projects, skills, experience timeline and
//! certifications.

use super::{Fragment, RenderOptions, link};
use crate::assets::{AssetProbe, to_webp_path};
use crate::escape::Text;
use crate::sanitize::asset_or_empty;
use crate::schema::{Certification, ExperienceEntry, FeaturedProject, SkillGroup};
use maud::{Markup, html};

pub fn render_featured(projects: &[FeaturedProject]) -> Fragment {
    let markup = html! {
        div.project-list {
            @for (i, project) in projects.iter().enumerate() {
                article.project-item.card id={ "project-" (Text(&project.id)) } {
                    div.card-body {
                        header.project-header {
                            h3.project-title { (Text(&project.title)) }
                            p.project-timeframe { (Text(&project.timeframe)) }
                        }
                        dl.project-details {
                            dt { "Problem" }
                            dd { (Text(&project.problem)) }
                            dt { "Impact" }
                            dd { (Text(&project.impact)) }
                        }
                        @if !project.tech.is_empty() {
                            (tech_list(&project.tech))
                        }
                        @if !project.links.is_empty() {
                            div.project-links {
                                @for (j, l) in project.links.iter().enumerate() {
                                    (link(
                                        &l.url,
                                        &format!("featured[{i}].links[{j}].url"),
                                        Some("btn btn-outline-primary btn-sm"),
                                        html! { (Text(&l.label)) },
                                    ))
                                }
                            }
                        }
                    }
                }
            }
        }
    };
    Fragment::new(markup, Vec::new())
}

pub fn render_skills(groups: &[SkillGroup]) -> Fragment {
    let markup = html! {
        div.skills-grid {
            @for group in groups {
                div.skill-group.card {
                    h3.skill-category { (Text(&group.category)) }
                    ul.skill-list {
                        @for item in &group.items {
                            li.badge { (Text(item)) }
                        }
                    }
                }
            }
        }
    };
    Fragment::new(markup, Vec::new())
}

pub fn render_experience(entries: &[ExperienceEntry]) -> Fragment {
    let markup = html! {
        div.main-timeline {
            @for entry in entries {
                div.timeline {
                    div.timeline-content {
                        span.timeline-dates { (Text(&entry.dates)) }
                        h3.timeline-role { (Text(&entry.role)) }
                        p.timeline-org { (Text(&entry.org)) }
                        ul.impact-list {
                            @for bullet in &entry.impact_bullets {
                                li { (Text(bullet)) }
                            }
                        }
                        @if !entry.tech.is_empty() {
                            (tech_list(&entry.tech))
                        }
                    }
                }
            }
        }
    };
    Fragment::new(markup, Vec::new())
}

pub fn render_certifications(
    certs: &[Certification],
    probe: &dyn AssetProbe,
    options: &RenderOptions,
) -> Fragment {
    let mut missing = Vec::new();
    let markup = html! {
        div.cert-list {
            @for (i, cert) in certs.iter().enumerate() {
                div.card.cert-card {
                    (cert_icon(cert, i, probe, options, &mut missing))
                    div.cert-body {
                        h3.cert-title {
                            (link(
                                &cert.link,
                                &format!("certifications[{i}].link"),
                                None,
                                html! { (Text(&cert.title)) },
                            ))
                        }
                        p.cert-issuer { (Text(&cert.issuer)) }
                        p.cert-issued { (Text(&cert.issued)) }
                        @if let Some(id) = &cert.credential_id {
                            p.cert-credential { "Credential ID: " (Text(id)) }
                        }
                    }
                }
            }
        }
    };
    Fragment::new(markup, missing)
}

fn cert_icon(
    cert: &Certification,
    index: usize,
    probe: &dyn AssetProbe,
    options: &RenderOptions,
    missing: &mut Vec<String>,
) -> Markup {
    let icon = cert
        .icon
        .as_deref()
        .map(|raw| asset_or_empty(raw, &format!("certifications[{index}].icon")))
        .filter(|icon| !icon.is_empty());

    let Some(icon) = icon else {
        return icon_placeholder(&cert.issuer);
    };
    if !probe.exists(&icon) {
        log::warn!("certification icon not found: {icon}");
        missing.push(icon);
        return icon_placeholder(&cert.issuer);
    }

    let alt = cert
        .icon_alt
        .clone()
        .unwrap_or_else(|| format!("{} logo", cert.issuer));
    let webp = to_webp_path(&icon).filter(|w| probe.exists(w));
    let size = options.icon_size;
    html! {
        picture.cert-icon {
            @if let Some(webp) = &webp {
                source type="image/webp" srcset=(Text(webp));
            }
            img src=(Text(&icon)) alt=(Text(&alt)) width=(size) height=(size) loading="lazy" decoding="async";
        }
    }
}

fn icon_placeholder(issuer: &str) -> Markup {
    let initial: String = issuer
        .chars()
        .find(|c| c.is_alphanumeric())
        .map(|c| c.to_uppercase().collect())
        .unwrap_or_default();
    html! {
        span.cert-icon.cert-icon-placeholder aria-hidden="true" { (Text(&initial)) }
    }
}

fn tech_list(tech: &[String]) -> Markup {
    html! {
        ul.tech-list aria-label="Technologies" {
            @for t in tech {
                li.badge { (Text(t)) }
            }
        }
    }
}
