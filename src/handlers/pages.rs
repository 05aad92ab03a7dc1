//! About and Portfolio pages. Content is fixed; nothing is fetched.

use askama::Template;
use axum::extract::State;
use axum::response::Html;

use crate::filters;
use crate::state::AppState;

use super::NavContext;

/// Core values as (name, description)
const CORE_VALUES: &[(&str, &str)] = &[
  (
    "Innovation",
    "Continuously exploring and implementing cutting-edge technologies to provide the best solutions.",
  ),
  (
    "Security",
    "Prioritizing the safety and privacy of our clients through robust cybersecurity practices.",
  ),
  (
    "Empowerment",
    "Enabling individuals and businesses to harness technology for growth and success.",
  ),
  (
    "Integrity",
    "Upholding honesty, transparency, and ethical practices in all our operations.",
  ),
  (
    "Community",
    "Fostering a supportive environment that encourages learning, collaboration, and positive impact.",
  ),
];

const OFFERINGS: &[&str] = &[
  "POST-UTME registrations (basic to premium packages)",
  "University inquiries & on-site registrations",
  "Matriculation attendance & acting as guardians for students",
  "Smartphone tracking support",
  "CCTV & surveillance setup",
  "Software and web development",
  "UI/UX design & graphics design",
  "Online registrations",
  "Virtual assistance and administrative support",
  "Digital content creation",
  "Student mentorship and academic guidance",
];

const SKILLS: &[&str] = &[
  "Cybersecurity (Endpoint Security, Malware Analysis)",
  "Smartphone Tracking & Device Recovery Support",
  "CCTV Surveillance & System Installation",
  "Front-End Development (HTML, CSS, JavaScript)",
  "UI/UX Design (Wireframing, Prototyping, User-Centric Design)",
  "Graphics Design (Photoshop, Illustrator, Canva, CorelDraw)",
  "Virtual Assistance (Admin Support, Project Management)",
  "Digital Content & Resource Development",
  "Website Maintenance",
  "Problem-Solving & Critical Thinking",
];

/// Certifications as (issuer, detail)
const CERTIFICATIONS: &[(&str, &str)] = &[
  ("Cisco Certified", "Endpoint Security & Malware Analysis"),
  ("ALX Certified", "Virtual Assistance"),
  ("Diploma", "Software Engineering"),
  ("Degree", "Cybersecurity (Hons), Lincoln University College Keffi, Nigeria"),
];

const ROLES: &[&str] = &[
  "Founder, BerryRay Technologies",
  "Co-Founder, CyberRant (Tech Startup)",
  "Tech Educator & Youth Mentor",
  "Registration Manager & Digital Services Consultant",
];

/// Projects as (name, description)
const PROJECTS: &[(&str, &str)] = &[
  ("K Asha Editor", "a mobile-friendly code editor designed for students without laptops"),
  (
    "K Asha Hall of Wisdom",
    "a curated e-library with study materials tailored to each course of study",
  ),
];

#[derive(Template)]
#[template(path = "about.html")]
pub struct AboutTemplate {
  pub nav: NavContext,
  pub core_values: &'static [(&'static str, &'static str)],
}

#[derive(Template)]
#[template(path = "portfolio.html")]
pub struct PortfolioTemplate {
  pub nav: NavContext,
  pub offerings: &'static [&'static str],
  pub skills: &'static [&'static str],
  pub certifications: &'static [(&'static str, &'static str)],
  pub roles: &'static [&'static str],
  pub projects: &'static [(&'static str, &'static str)],
}

pub async fn about(State(state): State<AppState>) -> Html<String> {
  let template = AboutTemplate {
    nav: NavContext::new(&state, "about"),
    core_values: CORE_VALUES,
  };
  Html(template.render().unwrap_or_default())
}

pub async fn portfolio(State(state): State<AppState>) -> Html<String> {
  let template = PortfolioTemplate {
    nav: NavContext::new(&state, "portfolio"),
    offerings: OFFERINGS,
    skills: SKILLS,
    certifications: CERTIFICATIONS,
    roles: ROLES,
    projects: PROJECTS,
  };
  Html(template.render().unwrap_or_default())
}
