//! Populates a fresh database with demo accounts and sample data.
//!
//! Every table is cleared first. All accounts share [`SEED_PASSWORD`] so the
//! platform can be explored with any role straight after seeding.

use chrono::{Duration, NaiveTime, TimeZone, Utc};
use rusqlite::Connection;
use thiserror::Error;
use tracing::info;

use crate::auth::{AuthError, AuthService};
use crate::database::models::{
    ApplicationStatus, Course, GrievanceCategory, GrievanceStatus, NewCalendarEvent, NewCourse,
    NewGrievance, NewOpportunity, NewResource, NewTask, NewUser, OpportunityType, Priority,
    ResourceType, TaskChanges, TaskStatus, User, UserRole,
};
use crate::database::{self, queries, Database};

pub const SEED_PASSWORD: &str = "password123";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to hash seed password: {0}")]
    Auth(#[from] AuthError),

    #[error("database error while seeding: {0}")]
    Database(#[from] rusqlite::Error),
}

struct SeedUser {
    email: &'static str,
    display_name: &'static str,
    department: &'static str,
    role: UserRole,
}

const USERS: &[SeedUser] = &[
    SeedUser {
        email: "faculty1@iitmandi.ac.in",
        display_name: "Dr. Rajesh Kumar",
        department: "Computer Science",
        role: UserRole::Faculty,
    },
    SeedUser {
        email: "faculty2@iitmandi.ac.in",
        display_name: "Dr. Priya Sharma",
        department: "Electrical Engineering",
        role: UserRole::Faculty,
    },
    SeedUser {
        email: "authority1@iitmandi.ac.in",
        display_name: "Dr. Authority One",
        department: "Computer Science",
        role: UserRole::Authority,
    },
    SeedUser {
        email: "authority2@iitmandi.ac.in",
        display_name: "Prof. Authority Two",
        department: "Mechanical Engineering",
        role: UserRole::Authority,
    },
    SeedUser {
        email: "student1@students.iitmandi.ac.in",
        display_name: "Rahul Verma",
        department: "Computer Science",
        role: UserRole::Student,
    },
    SeedUser {
        email: "student2@students.iitmandi.ac.in",
        display_name: "Neha Gupta",
        department: "Electrical Engineering",
        role: UserRole::Student,
    },
    SeedUser {
        email: "admin@iitmandi.ac.in",
        display_name: "System Admin",
        department: "Computer Science",
        role: UserRole::Admin,
    },
];

/// Row counts of what was created.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub courses: usize,
    pub enrollments: usize,
    pub resources: usize,
    pub calendar_events: usize,
    pub grievances: usize,
    pub opportunities: usize,
    pub applications: usize,
    pub tasks: usize,
}

/// Emails of the seeded accounts with their roles, for printing after a run.
pub fn seeded_accounts() -> impl Iterator<Item = (&'static str, UserRole)> {
    USERS.iter().map(|user| (user.email, user.role))
}

/// Clears every table and inserts the demo data set. Runs as one
/// transaction, so a failed run leaves the previous contents in place.
pub async fn seed(db: &Database, auth: &AuthService) -> Result<SeedSummary, SeedError> {
    let password_hash = auth.hash_password(SEED_PASSWORD).await?;
    let summary = db
        .call(|conn| -> rusqlite::Result<SeedSummary> {
            let tx = conn.transaction()?;
            database::reset(&tx)?;
            let summary = populate(&tx, &password_hash)?;
            tx.commit()?;
            Ok(summary)
        })
        .await?;
    info!(?summary, "database seeded");
    Ok(summary)
}

fn by_role(users: &[User], role: UserRole) -> Vec<&User> {
    users.iter().filter(|user| user.role == role).collect()
}

fn populate(conn: &Connection, password_hash: &str) -> rusqlite::Result<SeedSummary> {
    let mut summary = SeedSummary::default();

    let users = USERS
        .iter()
        .map(|user| {
            queries::insert_user(
                conn,
                &NewUser {
                    email: user.email,
                    password_hash,
                    role: user.role,
                    display_name: Some(user.display_name),
                    department: Some(user.department),
                    avatar_url: None,
                },
            )
        })
        .collect::<rusqlite::Result<Vec<_>>>()?;
    summary.users = users.len();

    let faculty = by_role(&users, UserRole::Faculty);
    let authorities = by_role(&users, UserRole::Authority);
    let students = by_role(&users, UserRole::Student);

    let courses = seed_courses(conn, &faculty)?;
    summary.courses = courses.len();
    summary.enrollments = seed_enrollments(conn, &students, &courses)?;
    summary.resources = seed_resources(conn, &courses)?;
    summary.calendar_events = seed_calendar(conn, &courses)?;
    summary.grievances = seed_grievances(conn, &students, &authorities)?;
    let (opportunities, applications) = seed_opportunities(conn, &faculty, &authorities, &students)?;
    summary.opportunities = opportunities;
    summary.applications = applications;
    summary.tasks = seed_tasks(conn, &students)?;

    Ok(summary)
}

fn seed_courses(conn: &Connection, faculty: &[&User]) -> rusqlite::Result<Vec<Course>> {
    const COURSES: &[(&str, &str, i64, &str, &str, usize)] = &[
        (
            "CS101",
            "Introduction to Computer Science",
            4,
            "Computer Science",
            "Fundamental concepts of computer science and programming.",
            0,
        ),
        (
            "CS201",
            "Data Structures and Algorithms",
            4,
            "Computer Science",
            "Arrays, linked lists, trees, graphs, sorting and searching.",
            0,
        ),
        (
            "CS301",
            "Machine Learning",
            3,
            "Computer Science",
            "Machine learning algorithms, neural networks and applications.",
            0,
        ),
        (
            "EE101",
            "Basic Electrical Engineering",
            4,
            "Electrical Engineering",
            "Circuits, signals and systems.",
            1,
        ),
        (
            "EE201",
            "Digital Signal Processing",
            3,
            "Electrical Engineering",
            "Fourier transforms and filter design.",
            1,
        ),
    ];

    COURSES
        .iter()
        .map(|&(code, name, credits, department, description, professor)| {
            let professor_id = faculty
                .get(professor % faculty.len().max(1))
                .map(|user| user.id.as_str());
            queries::insert_course(
                conn,
                &NewCourse {
                    code,
                    name,
                    credits,
                    semester: "Spring 2026",
                    professor_id,
                    department,
                    description: Some(description),
                },
            )
        })
        .collect()
}

/// Enrolls each student in the courses of their department, with some
/// attendance already recorded.
fn seed_enrollments(
    conn: &Connection,
    students: &[&User],
    courses: &[Course],
) -> rusqlite::Result<usize> {
    let mut count = 0;
    for student in students {
        for (offset, course) in courses
            .iter()
            .filter(|course| Some(course.department.as_str()) == student.department.as_deref())
            .enumerate()
        {
            let enrollment = queries::insert_enrollment(conn, &student.id, course)?;
            let total = 20;
            queries::record_attendance(conn, &enrollment.id, total - 2 * offset as i64 - 1, total)?;
            count += 1;
        }
    }
    Ok(count)
}

fn seed_resources(conn: &Connection, courses: &[Course]) -> rusqlite::Result<usize> {
    let mut count = 0;
    for course in courses {
        let Some(uploader) = course.professor_id.as_deref() else {
            continue;
        };
        let tags = vec![course.code.clone(), "2025".to_string()];
        queries::insert_resource(
            conn,
            &NewResource {
                course_id: &course.id,
                uploader_id: uploader,
                resource_type: ResourceType::Paper,
                title: &format!("{} End Semester Paper", course.code),
                year: Some(2025),
                exam_type: Some("End Semester"),
                file_path: None,
                tags: &tags,
            },
        )?;
        queries::insert_resource(
            conn,
            &NewResource {
                course_id: &course.id,
                uploader_id: uploader,
                resource_type: ResourceType::Notes,
                title: &format!("{} Lecture Notes", course.name),
                year: None,
                exam_type: None,
                file_path: None,
                tags: &tags[..1],
            },
        )?;
        count += 2;
    }
    Ok(count)
}

/// Two lectures a week for four weeks, one assignment and one quiz per course.
fn seed_calendar(conn: &Connection, courses: &[Course]) -> rusqlite::Result<usize> {
    let today = Utc::now().date_naive();
    let at = |days: i64, hour: u32, minute: u32| {
        let time = NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default();
        Utc.from_utc_datetime(&(today + Duration::days(days)).and_time(time))
    };

    let mut count = 0;
    for course in courses {
        let Some(creator) = course.professor_id.as_deref() else {
            continue;
        };
        let lecture_title = format!("Lecture: {}", course.name);
        let lecture_description = format!("Regular scheduled lecture for {}", course.code);
        let offset = (course.code.len() % 2) as i64;

        let mut events = Vec::new();
        for week in 0..4 {
            for extra in [0, 2] {
                let day = week * 7 + offset + extra;
                events.push((
                    lecture_title.clone(),
                    lecture_description.clone(),
                    "Lecture",
                    at(day, 10, 0),
                    at(day, 11, 30),
                ));
            }
        }
        events.push((
            "Assignment 1 Due".to_string(),
            format!("First assignment submission for {}", course.code),
            "Assignment",
            at(14, 23, 59),
            at(14, 23, 59),
        ));
        events.push((
            "Quiz 1".to_string(),
            format!("First quiz covering initial chapters of {}", course.code),
            "Exam",
            at(21, 14, 0),
            at(21, 15, 0),
        ));

        for (title, description, event_type, start, end) in &events {
            queries::insert_calendar_event(
                conn,
                &NewCalendarEvent {
                    course_id: Some(course.id.as_str()),
                    title,
                    description: Some(description.as_str()),
                    event_type: *event_type,
                    start_date: *start,
                    end_date: Some(*end),
                    created_by: creator,
                },
            )?;
        }
        count += events.len();
    }
    Ok(count)
}

fn seed_grievances(
    conn: &Connection,
    students: &[&User],
    authorities: &[&User],
) -> rusqlite::Result<usize> {
    const GRIEVANCES: &[(&str, &str, GrievanceCategory, Priority, &str, bool, GrievanceStatus, usize)] = &[
        (
            "WiFi not working in Hostel Block A",
            "The WiFi has been down for 3 days in Hostel Block A, rooms 101-150.",
            GrievanceCategory::Infrastructure,
            Priority::High,
            "Hostel Block A",
            false,
            GrievanceStatus::Submitted,
            0,
        ),
        (
            "Library AC needs repair",
            "The air conditioning in the main library reading room is not working properly.",
            GrievanceCategory::Infrastructure,
            Priority::Medium,
            "Main Library",
            true,
            GrievanceStatus::UnderReview,
            0,
        ),
        (
            "Canteen food quality issue",
            "The quality of food in the main canteen has degraded significantly.",
            GrievanceCategory::Food,
            Priority::Urgent,
            "Main Canteen",
            false,
            GrievanceStatus::InProgress,
            1,
        ),
        (
            "Broken furniture in classroom B-204",
            "Several chairs and desks in classroom B-204 are broken.",
            GrievanceCategory::Infrastructure,
            Priority::Medium,
            "Classroom B-204",
            false,
            GrievanceStatus::Submitted,
            1,
        ),
        (
            "Hostel laundry machines not working",
            "All three washing machines in the Hostel Block C laundry room are out of order.",
            GrievanceCategory::Hostel,
            Priority::High,
            "Hostel Block C Laundry",
            true,
            GrievanceStatus::Submitted,
            0,
        ),
    ];

    if students.is_empty() {
        return Ok(0);
    }
    for &(title, description, category, priority, location, is_anonymous, status, student) in GRIEVANCES {
        let student = students[student % students.len()];
        let id = queries::insert_grievance(
            conn,
            &NewGrievance {
                submitter_id: (!is_anonymous).then_some(student.id.as_str()),
                category,
                priority,
                location,
                title,
                description,
                is_anonymous,
            },
            &student.id,
        )?;
        if status != GrievanceStatus::Submitted {
            if let Some(authority) = authorities.first() {
                queries::add_grievance_update(
                    conn,
                    &id,
                    &authority.id,
                    status,
                    "Under review by authority",
                )?;
            }
        }
    }
    Ok(GRIEVANCES.len())
}

fn seed_opportunities(
    conn: &Connection,
    faculty: &[&User],
    authorities: &[&User],
    students: &[&User],
) -> rusqlite::Result<(usize, usize)> {
    struct Posting {
        title: &'static str,
        description: &'static str,
        kind: OpportunityType,
        skills: &'static [&'static str],
        duration: &'static str,
        stipend: &'static str,
        days_open: i64,
        by_faculty: bool,
        owner: usize,
    }

    const POSTINGS: &[Posting] = &[
        Posting {
            title: "Research Assistant - Machine Learning",
            description: "Research on neural networks and deep learning in computer vision.",
            kind: OpportunityType::Research,
            skills: &["Python", "Machine Learning", "TensorFlow", "PyTorch"],
            duration: "6 months",
            stipend: "8000/month",
            days_open: 30,
            by_faculty: true,
            owner: 0,
        },
        Posting {
            title: "Summer Internship - Web Development",
            description: "Full-stack web development internship on real projects.",
            kind: OpportunityType::Internship,
            skills: &["JavaScript", "React", "Node.js", "PostgreSQL"],
            duration: "3 months",
            stipend: "15000/month",
            days_open: 45,
            by_faculty: true,
            owner: 0,
        },
        Posting {
            title: "Research Project - Data Science",
            description: "Campus data analytics and student performance prediction.",
            kind: OpportunityType::Research,
            skills: &["Python", "Data Science", "Statistics", "Pandas"],
            duration: "1 year",
            stipend: "10000/month",
            days_open: 60,
            by_faculty: false,
            owner: 0,
        },
        Posting {
            title: "Research Assistant - IoT Systems",
            description: "Sensors, embedded systems and data collection.",
            kind: OpportunityType::Research,
            skills: &["C++", "Arduino", "Raspberry Pi", "Embedded Systems"],
            duration: "6 months",
            stipend: "9000/month",
            days_open: 35,
            by_faculty: true,
            owner: 1,
        },
        Posting {
            title: "Campus Sustainability Project",
            description: "Campus sustainability initiatives and green energy solutions.",
            kind: OpportunityType::Research,
            skills: &["Research", "Data Analysis", "Sustainability", "Reporting"],
            duration: "8 months",
            stipend: "7500/month",
            days_open: 50,
            by_faculty: false,
            owner: 1,
        },
    ];

    let today = Utc::now().date_naive();
    let (mut opportunities, mut applications) = (0, 0);
    for posting in POSTINGS {
        let owners = if posting.by_faculty { faculty } else { authorities };
        let Some(owner) = owners.get(posting.owner % owners.len().max(1)) else {
            continue;
        };
        let skills: Vec<String> = posting.skills.iter().map(|s| s.to_string()).collect();
        let opportunity = queries::insert_opportunity(
            conn,
            &NewOpportunity {
                faculty_id: &owner.id,
                title: posting.title,
                description: posting.description,
                opportunity_type: posting.kind,
                skills: &skills,
                duration: posting.duration,
                stipend: Some(posting.stipend),
                deadline: today + Duration::days(posting.days_open),
            },
        )?;
        opportunities += 1;

        for (index, student) in students.iter().enumerate() {
            let cover_letter = format!(
                "I am very interested in this {} position. I have relevant experience in {} and am eager to contribute.",
                posting.kind.as_str().to_lowercase(),
                skills[..2.min(skills.len())].join(", ")
            );
            let application =
                queries::insert_application(conn, &opportunity.id, &student.id, &cover_letter)?;
            if index > 0 {
                queries::set_application_status(conn, &application.id, ApplicationStatus::UnderReview)?;
            }
            applications += 1;
        }
    }
    Ok((opportunities, applications))
}

fn seed_tasks(conn: &Connection, students: &[&User]) -> rusqlite::Result<usize> {
    const TASKS: &[&[(&str, &str, &str, TaskStatus, i64)]] = &[
        &[
            ("Complete ML Assignment", "Finish the neural network assignment for CS301", "Academic", TaskStatus::InProgress, 60),
            ("Prepare for Midterm", "Study chapters 1-5 for CS201 midterm exam", "Academic", TaskStatus::Pending, 0),
            ("Research Paper Reading", "Read and summarize 3 papers on deep learning", "Research", TaskStatus::Completed, 100),
        ],
        &[
            ("Complete Circuit Design Lab", "Design and simulate amplifier circuit for EE lab", "Academic", TaskStatus::InProgress, 40),
            ("Signal Processing Project", "Implement FFT algorithm for DSP course", "Academic", TaskStatus::Pending, 10),
            ("Apply for Summer Internship", "Prepare resume and apply to 5 companies", "Career", TaskStatus::InProgress, 75),
            ("Gym Workout", "Daily workout routine - cardio and weights", "Personal", TaskStatus::Pending, 0),
        ],
    ];

    let mut count = 0;
    for (student, tasks) in students.iter().zip(TASKS) {
        for &(title, description, category, status, progress) in tasks.iter() {
            let task = queries::insert_task(
                conn,
                &NewTask {
                    student_id: &student.id,
                    title,
                    description: Some(description),
                    category,
                    deadline: None,
                },
            )?;
            queries::update_task(
                conn,
                &task.id,
                &student.id,
                &TaskChanges {
                    status: Some(status),
                    progress: Some(progress),
                    ..TaskChanges::default()
                },
            )?;
            count += 1;
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[tokio::test]
    async fn seeds_every_domain_and_is_repeatable() {
        let db = Database::open_in_memory().unwrap();
        let auth = AuthService::new(&Config {
            bcrypt_cost: 4,
            ..Config::default()
        });

        let first = seed(&db, &auth).await.unwrap();
        assert_eq!(first.users, USERS.len());
        assert_eq!(first.courses, 5);
        assert_eq!(first.grievances, 5);
        assert_eq!(first.opportunities, 5);
        assert_eq!(first.applications, 10);
        assert_eq!(first.tasks, 7);
        assert_eq!(first.enrollments, 5);
        assert_eq!(first.calendar_events, 5 * 10);

        let second = seed(&db, &auth).await.unwrap();
        assert_eq!(first, second);

        let user_count: i64 = db
            .call(|conn| conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0)))
            .await
            .unwrap();
        assert_eq!(user_count, USERS.len() as i64);
    }

    #[tokio::test]
    async fn failed_seed_keeps_previous_data() {
        let db = Database::open_in_memory().unwrap();
        let auth = AuthService::new(&Config {
            bcrypt_cost: 4,
            ..Config::default()
        });
        seed(&db, &auth).await.unwrap();
        db.call(|conn| {
            conn.execute_batch(
                "CREATE TRIGGER reject_tasks BEFORE INSERT ON tasks
                 BEGIN SELECT RAISE(ABORT, 'tasks are read-only'); END;",
            )
        })
        .await
        .unwrap();

        assert!(matches!(seed(&db, &auth).await, Err(SeedError::Database(_))));

        let (users, tasks): (i64, i64) = db
            .call(|conn| {
                conn.query_row(
                    "SELECT (SELECT COUNT(*) FROM users), (SELECT COUNT(*) FROM tasks)",
                    [],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
            })
            .await
            .unwrap();
        assert_eq!(users, USERS.len() as i64);
        assert_eq!(tasks, 7);
    }

    #[tokio::test]
    async fn seeded_accounts_can_log_in() {
        let db = Database::open_in_memory().unwrap();
        let auth = AuthService::new(&Config {
            bcrypt_cost: 4,
            ..Config::default()
        });
        seed(&db, &auth).await.unwrap();

        let user = db
            .call(|conn| queries::find_user_by_email(conn, "admin@iitmandi.ac.in"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.role, UserRole::Admin);
        assert!(auth.verify_password(SEED_PASSWORD, &user.password_hash).await.unwrap());
    }
}
