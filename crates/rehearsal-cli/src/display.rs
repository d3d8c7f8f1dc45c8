//! Terminal rendering for estimates, roster pages, and citizen cards.
//!
//! Cards are grouped into sections; a section with no values is skipped
//! entirely rather than printed empty.

use rand::Rng;
use rehearsal_core::pillars::Provenance;
use rehearsal_core::targeting::SAMPLE_SIZE;
use rehearsal_core::{CitizenView, Market, RosterState, RosterView, TargetingSession};

const LABEL_WIDTH: usize = 14;
const MAX_TRAITS: usize = 5;

// ── Public API ──

/// Print a targeting estimate with its Fermi breakdown and any warning.
pub fn print_estimate(session: &TargetingSession, displayed: u64) {
    let config = session.config();
    let market = config.market.config();
    let breakdown = session.breakdown();

    println!("=== Audience estimate {} {} ===", market.flag, config.market);
    println!();
    println!("Filter");
    print_row("age", &config.age_range.to_string());
    print_row("gender", &config.gender.to_string());
    if !config.occupations.is_empty() {
        let tags: Vec<&str> = config.occupations.iter().map(String::as_str).collect();
        print_row("occupations", &tags.join(", "));
    }
    println!();

    println!("Fermi breakdown");
    print_row("base", &group_thousands(breakdown.base_population));
    print_row("× age", &format!("{:.3}", breakdown.age_factor));
    print_row("× gender", &format!("{:.3}", breakdown.gender_factor));
    print_row("× occupation", &format!("{:.3}", breakdown.occupation_factor));
    println!();

    println!("Result");
    print_row("TAM", &format!("~{}", group_thousands(displayed)));
    print_row("of record", &group_thousands(session.tam()));
    print_row("sample size", &group_thousands(u64::from(SAMPLE_SIZE)));
    if let Err(warning) = session.validation() {
        println!();
        println!("warning: {warning}");
    }
}

/// Print the current roster page, or the explicit loading/error/empty state.
pub fn print_roster_page<R: Rng + ?Sized>(view: &RosterView, rng: &mut R) {
    match view.state() {
        RosterState::Loading => {
            println!("Loading citizens...");
            return;
        }
        RosterState::Failed(reason) => {
            println!("Citizen roster unavailable: {reason}");
            return;
        }
        RosterState::Ready(roster) if roster.is_empty() => {
            println!("No citizens in roster.");
            return;
        }
        RosterState::Ready(_) => {}
    }

    let Some(page) = view.page_views(rng) else {
        return;
    };
    let total = view.reported_total().unwrap_or_default();
    let market = view.market().config();

    print!("{} {}  population {}", market.flag, view.market(), group_thousands(total));
    if !view.query().is_empty() {
        print!("  query {:?}: {} matches", view.query(), page.total_matches);
    }
    println!();

    if page.items.is_empty() {
        println!("  (no matches)");
    }
    for item in &page.items {
        let age = item
            .citizen
            .age
            .map(|a| a.to_string())
            .unwrap_or_else(|| "-".into());
        println!(
            "  {:<8} {:<20} {:>3}  {:<16} {}",
            item.citizen.id.to_string(),
            truncate(&item.profile.name, 20),
            age,
            truncate(&item.profile.city, 16),
            item.profile.job,
        );
    }
    println!("page {}/{}", page.number, page.total_pages);
}

/// Print a single resolved citizen as a vertical card.
pub fn print_citizen_card(view: &CitizenView<'_>) {
    let citizen = view.citizen;
    let market = view.market;

    println!("=== {} ===", view.profile.name);
    println!("{} {}  avatar #{}", market.config().flag, market, view.avatar);
    println!();

    print_section(
        "Identity",
        &[
            ("id", Some(citizen.id.to_string())),
            ("age", citizen.age.map(|a| a.to_string())),
            ("gender", citizen.gender.clone()),
            ("city", Some(view.profile.city.clone())),
            ("job", Some(view.profile.job.clone())),
        ],
    );

    let traits = (!view.traits.is_empty()).then(|| {
        let shown: Vec<&str> = view.traits.iter().take(MAX_TRAITS).map(String::as_str).collect();
        shown.join(", ")
    });
    print_section(
        "Persona",
        &[
            ("pain point", view.profile.pain.clone()),
            ("traits", traits),
            ("life state", view.life_state.map(str::to_string)),
        ],
    );

    let pillars = match view.chart.provenance {
        Provenance::Recorded => view.chart.pillars.to_string(),
        Provenance::Placeholder => format!("{} (placeholder)", view.chart.pillars),
    };
    print_section(
        "Four pillars",
        &[
            ("element", Some(element_label(view))),
            ("structure", view.structure.map(str::to_string)),
            ("pillars", Some(pillars)),
            ("born", view.birth.clone()),
        ],
    );
}

// ── Section rendering ──

fn print_section(header: &str, rows: &[(&str, Option<String>)]) {
    if rows.iter().all(|(_, v)| v.is_none()) {
        return;
    }
    println!("{header}");
    for (label, value) in rows {
        if let Some(v) = value {
            print_row(label, v);
        }
    }
    println!();
}

fn print_row(label: &str, value: &str) {
    println!("  {:<width$} {}", label, value, width = LABEL_WIDTH);
}

fn element_label(view: &CitizenView<'_>) -> String {
    let element = view.chart.element;
    match view.market {
        Market::Us => format!("{} ({})", element.english(), element.han()),
        Market::Tw | Market::Cn => format!("{} ({})", element.han(), element.english()),
    }
}

// ── Helpers ──

/// Format an integer with comma thousands separators.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Truncate to at most `max` characters, marking the cut with `…`.
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}
