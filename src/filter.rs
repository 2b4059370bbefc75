use crate::models::*;

/// Pulls one searchable text out of an item. `None` when the relation
/// holding it is missing, which only fails that field.
pub type Field<T> = for<'a> fn(&'a T) -> Option<&'a str>;

/// Keeps the items where any field contains `term`, ignoring case.
/// Order is preserved and an empty term keeps everything.
pub fn filter<'a, T, I>(items: I, term: &str, fields: &[Field<T>]) -> Vec<&'a T>
where
    T: 'a,
    I: IntoIterator<Item = &'a T>,
{
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return items.into_iter().collect();
    }
    items
        .into_iter()
        .filter(|item| {
            fields.iter().any(|field| {
                field(*item)
                    .map(|text| text.to_lowercase().contains(&needle))
                    .unwrap_or(false)
            })
        })
        .collect()
}

fn course_code(c: &Course) -> Option<&str> {
    Some(&c.course_code)
}
fn course_name(c: &Course) -> Option<&str> {
    Some(&c.course_name)
}
fn course_stream(c: &Course) -> Option<&str> {
    Some(&c.stream)
}

fn class_name(c: &Class) -> Option<&str> {
    Some(&c.class_name)
}
fn class_course_name(c: &Class) -> Option<&str> {
    c.course_name()
}

fn report_class_name(r: &Report) -> Option<&str> {
    r.class.as_ref().map(|c| c.class_name.as_str())
}
fn report_course_name(r: &Report) -> Option<&str> {
    r.class.as_ref().and_then(Class::course_name)
}
fn report_topic(r: &Report) -> Option<&str> {
    Some(&r.topic_taught)
}
fn report_week(r: &Report) -> Option<&str> {
    Some(&r.week_of_reporting)
}
fn report_lecturer_name(r: &Report) -> Option<&str> {
    r.lecturer.as_ref().map(|u| u.name.as_str())
}

fn user_name(u: &User) -> Option<&str> {
    Some(&u.name)
}
fn user_email(u: &User) -> Option<&str> {
    Some(&u.email)
}
fn user_stream(u: &User) -> Option<&str> {
    u.stream.as_deref()
}

fn rating_class_name(r: &Rating) -> Option<&str> {
    r.class.as_ref().map(|c| c.class_name.as_str())
}
fn rating_course_name(r: &Rating) -> Option<&str> {
    r.class.as_ref().and_then(Class::course_name)
}
fn rating_student_name(r: &Rating) -> Option<&str> {
    r.student.as_ref().map(|u| u.name.as_str())
}

// per-view search fields

pub const PL_COURSE_FIELDS: &[Field<Course>] = &[course_code, course_name, course_stream];
pub const STREAM_COURSE_FIELDS: &[Field<Course>] = &[course_code, course_name];

pub const CLASS_FIELDS: &[Field<Class>] = &[class_name, class_course_name];

pub const MY_REPORT_FIELDS: &[Field<Report>] = &[report_class_name, report_week, report_topic];
pub const MONITORING_REPORT_FIELDS: &[Field<Report>] =
    &[report_class_name, report_course_name, report_topic];
pub const OVERSIGHT_REPORT_FIELDS: &[Field<Report>] =
    &[report_course_name, report_lecturer_name, report_topic];

pub const LECTURER_FIELDS: &[Field<User>] = &[user_name, user_email];
pub const PRL_FIELDS: &[Field<User>] = &[user_name, user_email, user_stream];

pub const RATING_FIELDS: &[Field<Rating>] =
    &[rating_class_name, rating_course_name, rating_student_name];

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classes(v: serde_json::Value) -> Vec<Class> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn empty_term_is_identity() {
        let all = classes(json!([
            {"id": 1, "className": "A"},
            {"id": 2, "className": "B"}
        ]));
        let out = filter(&all, "", CLASS_FIELDS);
        assert_eq!(out.len(), all.len());
        assert!(out.iter().zip(&all).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn matches_across_fields_ignoring_case() {
        let all = classes(json!([{"id": 1, "className": "A", "Course": {"id": 1, "courseName": "Web Dev"}}]));
        assert_eq!(filter(&all, "web", CLASS_FIELDS).len(), 1);
        assert_eq!(filter(&all, "WEB dev", CLASS_FIELDS).len(), 1);
        assert_eq!(filter(&all, "java", CLASS_FIELDS).len(), 0);
    }

    #[test]
    fn result_is_an_ordered_subsequence() {
        let all = classes(json!([
            {"id": 1, "className": "Networks 1"},
            {"id": 2, "className": "Databases"},
            {"id": 3, "className": "Networks 2"},
            {"id": 4, "className": "networks lab"}
        ]));
        let ids: Vec<Id> = filter(&all, "networks", CLASS_FIELDS).iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
    }

    #[test]
    fn missing_relation_only_fails_its_field() {
        let reports: Vec<Report> = serde_json::from_value(json!([
            {"id": 1, "topicTaught": "Sorting"},
            {"id": 2, "topicTaught": "Graphs", "Class": {"id": 5, "className": "Algorithms"}},
            {"id": 3, "topicTaught": "Sorting", "User": {"id": 9, "name": "Mpho"}}
        ]))
        .unwrap();
        let ids: Vec<Id> = filter(&reports, "sort", MONITORING_REPORT_FIELDS)
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(filter(&reports, "mpho", OVERSIGHT_REPORT_FIELDS).len(), 1);
        assert!(filter(&reports, "mpho", MONITORING_REPORT_FIELDS).is_empty());
    }

    #[test]
    fn prl_stream_is_searchable_when_assigned() {
        let users: Vec<User> = serde_json::from_value(json!([
            {"id": 1, "name": "A", "email": "a@x", "role": "prl", "stream": "Networking"},
            {"id": 2, "name": "B", "email": "b@x", "role": "prl", "stream": null}
        ]))
        .unwrap();
        let found = filter(&users, "network", PRL_FIELDS);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, 1);
    }

    #[test]
    fn works_over_already_scoped_views() {
        let all = classes(json!([
            {"id": 1, "className": "A", "Course": {"id": 1, "courseName": "Web Dev", "stream": "Networking"}},
            {"id": 2, "className": "B", "Course": {"id": 2, "courseName": "Web Security", "stream": "Cybersecurity"}}
        ]));
        let scoped = crate::aggregate::classes_in_stream(&all, "Networking");
        let out = filter(scoped.iter().copied(), "web", CLASS_FIELDS);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, 1);
    }
}
