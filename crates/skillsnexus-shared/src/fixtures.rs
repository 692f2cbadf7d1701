//! Built-in reference data the platform starts with.
//!
//! Everything here is static: the seeded course catalog, the partner
//! directory, learning personas, referral codes, pricing tiers, and the
//! landing page testimonials.

use serde::Serialize;

use crate::course::{Course, Lesson, Module};
use crate::persona::Persona;
use crate::pricing::{PricingTier, ReferralCode};
use crate::types::LessonKind::{Practical, Video};

// ---------------------------------------------------------------------------
// Courses
// ---------------------------------------------------------------------------

const THUMB_AI: &str = "https://images.unsplash.com/photo-1620712943543-bcc4688e7485?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80";
const THUMB_DATA: &str = "https://images.unsplash.com/photo-1551288049-bebda4e38f71?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80";
const THUMB_ECO: &str = "https://images.unsplash.com/photo-1532996122724-e3c354a0b15b?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80";
const THUMB_BRAND: &str = "https://images.unsplash.com/photo-1557804506-669a67965ba0?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80";
const THUMB_UBUNTU: &str = "https://images.unsplash.com/photo-1573164713988-8665fc963095?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80";

fn course(
    id: &str,
    title: &str,
    partner: &str,
    description: &str,
    (progress, xp, level): (u8, u32, u32),
    thumbnail: &str,
    modules: Vec<Module>,
) -> Course {
    let mut course = Course::new(id, title, partner, description);
    course.progress = Some(progress);
    course.xp = Some(xp);
    course.level_required = Some(level);
    course.thumbnail_url = Some(thumbnail.to_string());
    course.modules = modules;
    course
}

fn module(id: &str, title: &str, description: &str, lessons: Vec<Lesson>) -> Module {
    Module::new(id, title, description).with_lessons(lessons)
}

/// The catalog a fresh process starts with.
pub fn default_courses() -> Vec<Course> {
    vec![
        course(
            "c1",
            "Silver Intelligence: AI Masterclass",
            "JM Dev.co.za",
            "The complete blueprint for professionals 35+ to leverage AI without coding.",
            (12, 2500, 1),
            THUMB_AI,
            ai_masterclass_modules(),
        ),
        course(
            "c2",
            "Advanced Data Strategy",
            "JM Dev.co.za",
            "Deep dive into data analytics and backend integration for managers.",
            (0, 5000, 5),
            THUMB_DATA,
            Vec::new(),
        ),
        course(
            "c3",
            "Circular Economy & Recycling Systems",
            "EcoXpand.co.za",
            "Leading courses in recycling, waste-to-value systems, and sustainable expansion strategies.",
            (0, 3500, 2),
            THUMB_ECO,
            Vec::new(),
        ),
        course(
            "c4",
            "Strategic Brand Innovation",
            "R&D Marketing",
            "Using AI to revolutionize brand storytelling and market penetration.",
            (0, 4200, 3),
            THUMB_BRAND,
            Vec::new(),
        ),
        course(
            "c5",
            "Ubuntu-led Digital Transformation",
            "thedccsa.org",
            "Business Leadership and Social Entrepreneurship for Community GDP and MSME Growth.",
            (0, 6000, 1),
            THUMB_UBUNTU,
            ubuntu_modules(),
        ),
    ]
}

fn ai_masterclass_modules() -> Vec<Module> {
    vec![
        module(
            "m1",
            "Module 1: AI Foundations Made Simple",
            "Demystifying technology without the jargon.",
            vec![
                Lesson::new("l1", "Demystifying AI: What It Really Means for Your Career", "15 min", Video)
                    .unlocked()
                    .with_video(
                        "https://share.synthesia.io/f23236d2-fef5-4a37-b6e1-5d3c1cff43f9",
                        "Welcome to Module 1. In this video, we break down AI into simple terms...",
                    ),
                Lesson::new("l2", "AI History Without the Hype", "18 min", Video),
                Lesson::new("l3", "Key Concepts Explained (ML, NLP) in Plain English", "20 min", Video),
                Lesson::new("l4", "Practical: Self-assessment of AI opportunities", "30 min", Practical),
            ],
        ),
        module(
            "m2",
            "Module 2: Everyday AI Tools",
            "Immediate productivity gains for professionals.",
            vec![
                Lesson::new("l5", "Mastering ChatGPT for Professional Writing", "22 min", Video),
                Lesson::new("l6", "AI-Powered Research: Beyond Google Search", "15 min", Video),
                Lesson::new("l7", "Automating Repetitive Tasks", "25 min", Video),
                Lesson::new("l8", "Practical: Create your AI productivity toolkit", "45 min", Practical),
            ],
        ),
        module(
            "m3",
            "Module 3: Visual & Creative AI Applications",
            "Enhancing presentations and visual assets.",
            vec![
                Lesson::new("l9", "Image Generation with Midjourney for Business", "20 min", Video),
                Lesson::new("l10", "Video Creation & Editing with AI Tools", "18 min", Video),
                Lesson::new("l11", "AI-Enhanced Presentations", "20 min", Video),
            ],
        ),
        module(
            "m4",
            "Module 4: AI for Career Advancement",
            "Future-proofing your professional journey.",
            vec![
                Lesson::new("l12", "AI-Assisted Skill Development", "15 min", Video),
                Lesson::new("l13", "Optimizing Your Resume & LinkedIn with AI", "25 min", Video),
                Lesson::new("l14", "AI in Interview Preparation", "20 min", Video),
            ],
        ),
        module(
            "m5",
            "Module 5: Industry-Specific Applications",
            "Tailored strategies for your sector.",
            vec![
                Lesson::new("l15", "AI for Marketing & Sales", "20 min", Video),
                Lesson::new("l16", "AI for Managers & Team Leaders", "20 min", Video),
                Lesson::new("l17", "AI for Consultants", "20 min", Video),
            ],
        ),
        module(
            "m6",
            "Module 6: Future-Proofing & Ethics",
            "Navigating the changing landscape responsibly.",
            vec![
                Lesson::new("l18", "Navigating AI Ethics", "15 min", Video),
                Lesson::new("l19", "Identifying AI Opportunities", "15 min", Video),
                Lesson::new("l20", "Practical: 12-month AI integration roadmap", "60 min", Practical),
            ],
        ),
    ]
}

fn ubuntu_modules() -> Vec<Module> {
    // (module id, title, description, [(lesson id, title, duration)]); the
    // third lesson of every module is the practical.
    let outline: [(&str, &str, &str, [(&str, &str, &str); 3]); 10] = [
        ("m1_ub", "Module 1: The DNA of SA Social Entrepreneurship", "IKS as a Business Asset and Ubuntu philosophy.", [
            ("l1_ub", "IKS as a Business Asset: Ubuntu in Business", "20 min"),
            ("l2_ub", "Traditional Knowledge in Modern Economy", "25 min"),
            ("l3_ub", "Practical: Develop Community-Centric Business Thesis", "45 min"),
        ]),
        ("m2_ub", "Module 2: Identifying Market Needs", "Unemployment Landscape and Community Needs.", [
            ("l4_ub", "Community Needs Assessment Tools", "30 min"),
            ("l5_ub", "Mapping Local Skills & Resources", "25 min"),
            ("l6_ub", "Practical: Community Asset Mapping", "60 min"),
        ]),
        ("m3_ub", "Module 3: Principles of Sustainable Social Enterprise", "Profit, Impact, and Legal Structures.", [
            ("l7_ub", "The Double Bottom Line (Profit and Impact)", "20 min"),
            ("l8_ub", "Legal Structures & SROI in SA", "25 min"),
            ("l9_ub", "Practical: Create Social Impact Mandate", "45 min"),
        ]),
        ("m4_ub", "Module 4: Business Leadership in a Volatile Market", "Ethical Leadership and Strategic Planning.", [
            ("l10_ub", "Ethical Leadership & Governance for MSMEs", "25 min"),
            ("l11_ub", "Strategic Planning in High-Unemployment Contexts", "30 min"),
            ("l12_ub", "Practical: Mentorship Model Design", "40 min"),
        ]),
        ("m5_ub", "Module 5: Financial Management and Access to Capital", "Budgeting, Funding, and Investor Readiness.", [
            ("l13_ub", "MSME Finance Fundamentals", "35 min"),
            ("l14_ub", "Alternative Funding Models (CSI, Crowdfunding)", "30 min"),
            ("l15_ub", "Practical: 3-Year Financial Projection", "90 min"),
        ]),
        ("m6_ub", "Module 6: Market Strategy and Value Chain Integration", "Local Market Penetration and Branding.", [
            ("l16_ub", "Local Market Penetration & Value Proposition", "25 min"),
            ("l17_ub", "Branding & Competitive Analysis", "25 min"),
            ("l18_ub", "Practical: Marketing and Sales Strategy", "60 min"),
        ]),
        ("m7_ub", "Module 7: Digital Transformation for the MSME", "Foundational Digital Tools and 4IR.", [
            ("l19_ub", "Foundational Digital Tools (Cloud, Accounting)", "30 min"),
            ("l20_ub", "Understanding 4IR for Small Business", "20 min"),
            ("l21_ub", "Practical: Setup Digital Productivity Suite", "45 min"),
        ]),
        ("m8_ub", "Module 8: E-Commerce and Digital Market Access", "Online Presence and Digital Marketing.", [
            ("l22_ub", "Building an Affordable E-Commerce Platform", "40 min"),
            ("l23_ub", "Digital Marketing & SEO Fundamentals", "35 min"),
            ("l24_ub", "Practical: Launch E-Commerce Draft", "90 min"),
        ]),
        ("m9_ub", "Module 9: Scaling, Job Creation, and Community GDP", "Operational Scaling and Economic Impact.", [
            ("l25_ub", "Operational Scaling Strategies", "30 min"),
            ("l26_ub", "Measuring Community GDP Impact", "25 min"),
            ("l27_ub", "Practical: Growth and Scaling Plan", "60 min"),
        ]),
        ("m10_ub", "Module 10: Pitch and Sustainability Road-Map (Capstone)", "Refining Plans and Pitching.", [
            ("l28_ub", "Refining the Business Plan", "45 min"),
            ("l29_ub", "Pitching to Investors", "45 min"),
            ("l30_ub", "Practical: Final Sustainability Road-Map", "120 min"),
        ]),
    ];

    outline
        .iter()
        .map(|(id, title, description, lessons)| {
            let lessons = lessons
                .iter()
                .enumerate()
                .map(|(i, (lesson_id, lesson_title, duration))| {
                    let kind = if i == 2 { Practical } else { Video };
                    Lesson::new(*lesson_id, lesson_title, duration, kind)
                })
                .collect();
            module(id, title, description, lessons)
        })
        .map(|mut m| {
            if m.id == "m1_ub" {
                m.lessons[0] = m.lessons[0]
                    .clone()
                    .unlocked()
                    .with_video(
                        "https://share.synthesia.io/3e7f0e4f-f3c2-4398-afbd-f2016e088a44",
                        "In this module, we explore how traditional African philosophy can drive modern business success...",
                    );
            }
            m
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Partners and personas
// ---------------------------------------------------------------------------

/// Short blurb for each known partner organisation.
pub const PARTNER_DESCRIPTIONS: &[(&str, &str)] = &[
    ("thedccsa.org", "The Digital Content Chamber of SA. Empowering professionals through digital literacy and AI adoption."),
    ("JM Dev.co.za", "Leading software development house specializing in enterprise systems and data architecture."),
    ("EcoXpand.co.za", "Pioneers in sustainable expansion strategies, recycling systems, and green-tech implementation."),
    ("R&D Marketing", "A research-driven marketing agency focusing on data-backed creative strategies."),
];

pub fn partner_description(partner: &str) -> Option<&'static str> {
    PARTNER_DESCRIPTIONS
        .iter()
        .find(|(name, _)| *name == partner)
        .map(|(_, description)| *description)
}

pub fn learning_personas() -> Vec<Persona> {
    vec![
        Persona {
            id: "social_impact".to_string(),
            title: "Social Impact Innovator".to_string(),
            description: "You want to build sustainable businesses, solve community problems, and lead with Ubuntu values.".to_string(),
            partners: vec![
                "thedccsa.org".to_string(),
                "R&D Marketing".to_string(),
                "EcoXpand.co.za".to_string(),
            ],
            icon: "🌱".to_string(),
        },
        Persona {
            id: "tech_visionary".to_string(),
            title: "Tech Visionary".to_string(),
            description: "You want to master AI tools, data strategy, and build scalable digital systems for the future.".to_string(),
            partners: vec!["JM Dev.co.za".to_string()],
            icon: "🚀".to_string(),
        },
    ]
}

pub const SA_CHAPTERS: &[&str] = &[
    "Cape Town Innovation Hub",
    "Jozi Digital Exchange",
    "Durban Coastal Node",
    "Gqeberha Tech Port",
];

// ---------------------------------------------------------------------------
// Pricing
// ---------------------------------------------------------------------------

pub fn referral_codes() -> Vec<ReferralCode> {
    vec![
        ReferralCode::new("JMDEV20", 20, "JM Dev"),
        ReferralCode::new("DCCSA15", 15, "The DCC"),
        ReferralCode::new("EARLYBIRD", 10, "System"),
        ReferralCode::new("ADMIN100", 100, "Admin"),
    ]
}

pub fn pricing_tiers() -> Vec<PricingTier> {
    let features = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    vec![
        PricingTier {
            id: "basic_tier".to_string(),
            name: "Basic".to_string(),
            price_zar: 1997,
            price_usd: 147,
            features: features(&[
                "Self-paced course access",
                "Downloadable resources",
                "Lifetime access to updates",
                "Certificate of Completion",
            ]),
            cta: "Start Learning".to_string(),
            is_recommended: false,
        },
        PricingTier {
            id: "premium_tier".to_string(),
            name: "Premium".to_string(),
            price_zar: 3997,
            price_usd: 297,
            features: features(&[
                "Everything in Basic",
                "Bi-weekly live Q&A sessions",
                "Private Community Access",
                "Exclusive Case Studies",
            ]),
            cta: "Join the Community".to_string(),
            is_recommended: true,
        },
        PricingTier {
            id: "elite_tier".to_string(),
            name: "Elite".to_string(),
            price_zar: 7997,
            price_usd: 597,
            features: features(&[
                "Everything in Premium",
                "1:1 Implementation Coaching",
                "Personalized Roadmap Review",
                "Accredited Executive Certification",
            ]),
            cta: "Apply for Elite".to_string(),
            is_recommended: false,
        },
    ]
}

// ---------------------------------------------------------------------------
// Landing page
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Testimonial {
    pub name: &'static str,
    pub role: &'static str,
    pub quote: &'static str,
    pub image: &'static str,
}

pub const TESTIMONIALS: &[Testimonial] = &[
    Testimonial {
        name: "Thabo Mokoena",
        role: "Marketing Director, Sandton",
        quote: "In the fast-paced financial district, falling behind isn't an option. This course helped me automate our reporting workflows without needing to hire a developer. It's tailored perfectly for the SA market context.",
        image: "https://images.unsplash.com/photo-1506277886164-e25aa3f4ef7f?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    },
    Testimonial {
        name: "Sarah Van Der Merwe",
        role: "Operations Manager, Cape Town",
        quote: "I was skeptical about AI, fearing it would replace my team. SkillsNexus taught me how to use it to empower them instead. The load shedding productivity hacks using offline AI tools were a game changer!",
        image: "https://images.unsplash.com/photo-1573496359142-b8d87734a5a2?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    },
    Testimonial {
        name: "Priya Naidoo",
        role: "SME Owner, Durban",
        quote: "Running a logistics business in KZN comes with challenges. This course gave me practical tools to optimize my routes and customer service instantly. Real ROI in Rands, not just theory.",
        image: "https://images.unsplash.com/photo-1589156280159-27698a70f29e?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_catalog_shape() {
        let courses = default_courses();
        assert_eq!(courses.len(), 5);
        assert_eq!(courses[0].lesson_count(), 20);
        assert_eq!(courses[4].lesson_count(), 30);
        assert!(courses[1].modules.is_empty());
    }

    #[test]
    fn test_seed_ids_unique_within_parent() {
        for course in default_courses() {
            let module_ids: HashSet<_> = course.modules.iter().map(|m| m.id.clone()).collect();
            assert_eq!(module_ids.len(), course.modules.len());
            for module in &course.modules {
                let lesson_ids: HashSet<_> = module.lessons.iter().map(|l| l.id.clone()).collect();
                assert_eq!(lesson_ids.len(), module.lessons.len());
            }
        }
    }

    #[test]
    fn test_only_opening_lessons_are_unlocked() {
        let courses = default_courses();
        let ubuntu = &courses[4];
        assert!(!ubuntu.modules[0].lessons[0].is_locked);
        assert!(ubuntu.modules[0].lessons[0].video_url.is_some());
        assert!(ubuntu.modules[0].lessons[1].is_locked);
        assert_eq!(ubuntu.modules[9].lessons[2].kind, Practical);
    }

    #[test]
    fn test_partner_description_lookup() {
        assert!(partner_description("R&D Marketing").is_some());
        assert!(partner_description("Unknown Org").is_none());
    }
}
