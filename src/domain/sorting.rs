use crate::domain::task::Task;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::str::FromStr;

/// Fields available for sorting tasks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Priority,
    Due,
    Created,
    Updated,
}

/// Sort order direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl FromStr for SortField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "title" => Ok(SortField::Title),
            "priority" => Ok(SortField::Priority),
            "due" => Ok(SortField::Due),
            "created" => Ok(SortField::Created),
            "updated" => Ok(SortField::Updated),
            _ => Err(format!(
                "Invalid sort field '{}'. Valid fields: title, priority, due, created, updated",
                s
            )),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Ascending),
            "desc" => Ok(SortOrder::Descending),
            _ => Err(format!(
                "Invalid sort order '{}'. Valid orders: asc, desc",
                s
            )),
        }
    }
}

/// Sorts tasks in place by the given field and direction.
///
/// The sort is stable, so tasks that compare equal keep their list order.
/// Tasks without a due date sort last for [`SortField::Due`] in either
/// direction.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use taskflow_core::domain::sorting::{sort_tasks, SortField, SortOrder};
/// use taskflow_core::domain::task::{NewTask, Priority, Task};
///
/// let now = Utc::now();
/// let mut tasks = vec![
///     Task::create(NewTask::new("B").with_priority(Priority::Low), now),
///     Task::create(NewTask::new("A").with_priority(Priority::High), now),
/// ];
///
/// sort_tasks(&mut tasks, SortField::Priority, SortOrder::Descending);
/// assert_eq!(tasks[0].title, "A");
/// ```
pub fn sort_tasks(tasks: &mut [Task], field: SortField, order: SortOrder) {
    tasks.sort_by(|a, b| {
        if field == SortField::Due {
            return compare_due_dates(a.due_date, b.due_date, order);
        }

        let cmp = match field {
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Priority => a.priority.rank().cmp(&b.priority.rank()),
            SortField::Created => a.created_at.cmp(&b.created_at),
            SortField::Updated => a.updated_at.cmp(&b.updated_at),
            SortField::Due => Ordering::Equal,
        };

        match order {
            SortOrder::Ascending => cmp,
            SortOrder::Descending => cmp.reverse(),
        }
    });
}

/// Compare optional due dates with None always sorting to the end
fn compare_due_dates(
    a: Option<DateTime<Utc>>,
    b: Option<DateTime<Utc>>,
    order: SortOrder,
) -> Ordering {
    match (a, b) {
        (Some(a_date), Some(b_date)) => match order {
            SortOrder::Ascending => a_date.cmp(&b_date),
            SortOrder::Descending => b_date.cmp(&a_date),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::task::{NewTask, Priority};
    use chrono::Duration;

    fn task(title: &str) -> Task {
        Task::create(NewTask::new(title), Utc::now())
    }

    #[test]
    fn test_sort_by_title_case_insensitive() {
        let mut tasks = vec![task("zebra"), task("Apple"), task("BANANA")];

        sort_tasks(&mut tasks, SortField::Title, SortOrder::Ascending);

        assert_eq!(tasks[0].title, "Apple");
        assert_eq!(tasks[1].title, "BANANA");
        assert_eq!(tasks[2].title, "zebra");
    }

    #[test]
    fn test_sort_by_priority() {
        let now = Utc::now();
        let mut tasks = vec![
            Task::create(NewTask::new("m").with_priority(Priority::Medium), now),
            Task::create(NewTask::new("h").with_priority(Priority::High), now),
            Task::create(NewTask::new("l").with_priority(Priority::Low), now),
        ];

        sort_tasks(&mut tasks, SortField::Priority, SortOrder::Ascending);
        assert_eq!(tasks[0].title, "l");
        assert_eq!(tasks[2].title, "h");

        sort_tasks(&mut tasks, SortField::Priority, SortOrder::Descending);
        assert_eq!(tasks[0].title, "h");
        assert_eq!(tasks[2].title, "l");
    }

    #[test]
    fn test_sort_by_due_puts_undated_last_in_both_orders() {
        let now = Utc::now();
        let soon = Task::create(NewTask::new("soon").with_due_date(now), now);
        let later = Task::create(
            NewTask::new("later").with_due_date(now + Duration::days(3)),
            now,
        );
        let undated = task("undated");

        let mut tasks = vec![undated.clone(), later.clone(), soon.clone()];
        sort_tasks(&mut tasks, SortField::Due, SortOrder::Ascending);
        assert_eq!(tasks[0].title, "soon");
        assert_eq!(tasks[1].title, "later");
        assert_eq!(tasks[2].title, "undated");

        let mut tasks = vec![undated, soon, later];
        sort_tasks(&mut tasks, SortField::Due, SortOrder::Descending);
        assert_eq!(tasks[0].title, "later");
        assert_eq!(tasks[1].title, "soon");
        assert_eq!(tasks[2].title, "undated");
    }

    #[test]
    fn test_sort_is_stable() {
        let mut tasks = vec![task("first"), task("second"), task("third")];

        sort_tasks(&mut tasks, SortField::Priority, SortOrder::Ascending);

        assert_eq!(tasks[0].title, "first");
        assert_eq!(tasks[1].title, "second");
        assert_eq!(tasks[2].title, "third");
    }

    #[test]
    fn test_parse_sort_options() {
        assert_eq!(SortField::from_str("DUE").unwrap(), SortField::Due);
        assert_eq!(SortOrder::from_str("desc").unwrap(), SortOrder::Descending);
        assert!(SortField::from_str("status").is_err());
        assert!(SortOrder::from_str("up").is_err());
    }
}
