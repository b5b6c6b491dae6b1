//! Utility functions for the container
//!
//! Bean naming conventions and dependency bookkeeping shared by the bean
//! factory, the application context and the derive macros.

/// Naming convention utilities for bean names
pub mod naming {
    /// Converts a PascalCase type name to camelCase for bean naming.
    ///
    /// `UserService` becomes `userService`, which is the default bean name
    /// of a component.
    ///
    /// # Examples
    ///
    /// ```
    /// use injection_core::utils::naming::to_camel_case;
    ///
    /// assert_eq!(to_camel_case("FirstComponent"), "firstComponent");
    /// assert_eq!(to_camel_case("A"), "a");
    /// assert_eq!(to_camel_case(""), "");
    /// ```
    pub fn to_camel_case(s: &str) -> String {
        let mut chars = s.chars();
        match chars.next() {
            None => String::new(),
            Some(first) => {
                let mut result = String::with_capacity(s.len());
                result.extend(first.to_lowercase());
                result.push_str(chars.as_str());
                result
            }
        }
    }

    /// Converts a snake_case identifier to lowerCamelCase.
    ///
    /// Field and parameter names are snake_case in Rust while bean names are
    /// camelCase, so `first_component` has to match the bean
    /// `firstComponent` during name-based disambiguation.
    ///
    /// # Examples
    ///
    /// ```
    /// use injection_core::utils::naming::snake_to_camel_case;
    ///
    /// assert_eq!(snake_to_camel_case("first_component"), "firstComponent");
    /// assert_eq!(snake_to_camel_case("component"), "component");
    /// ```
    pub fn snake_to_camel_case(s: &str) -> String {
        let mut result = String::with_capacity(s.len());
        let mut upper_next = false;

        for ch in s.chars() {
            if ch == '_' {
                // 开头的下划线不产生大写
                upper_next = !result.is_empty();
            } else if upper_next {
                result.extend(ch.to_uppercase());
                upper_next = false;
            } else {
                result.push(ch);
            }
        }

        result
    }

    /// Whether an injection point name refers to the given bean name.
    ///
    /// Matches either the identifier as written or its camelCase form.
    pub fn matches_bean_name(point_name: &str, bean_name: &str) -> bool {
        point_name == bean_name || snake_to_camel_case(point_name) == bean_name
    }
}

/// Dependency resolution utilities
pub mod dependency {
    use parking_lot::Mutex;
    use std::collections::{HashMap, HashSet};
    use std::thread::{self, ThreadId};

    /// Tracks beans currently being created to detect circular dependencies.
    ///
    /// Each thread has its own creation stack, kept in order so the reported
    /// chain reads `a -> b -> a`. Two threads building the same bean are not
    /// a cycle.
    #[derive(Debug, Default)]
    pub struct CreationTracker {
        creating: Mutex<HashMap<ThreadId, Vec<String>>>,
    }

    impl CreationTracker {
        /// Creates a new empty creation tracker.
        pub fn new() -> Self {
            Self::default()
        }

        /// Checks if a bean is currently being created on this thread.
        pub fn is_creating(&self, name: &str) -> bool {
            self.creating
                .lock()
                .get(&thread::current().id())
                .is_some_and(|stack| stack.iter().any(|n| n == name))
        }

        /// Marks a bean as being created on this thread.
        ///
        /// Returns `false` if the bean was already on this thread's creation
        /// stack (circular dependency detected).
        pub fn start_creating(&self, name: &str) -> bool {
            let mut creating = self.creating.lock();
            let stack = creating.entry(thread::current().id()).or_default();
            if stack.iter().any(|n| n == name) {
                return false;
            }
            stack.push(name.to_string());
            true
        }

        /// Marks a bean as finished being created on this thread.
        pub fn finish_creating(&self, name: &str) {
            let mut creating = self.creating.lock();
            let id = thread::current().id();
            if let Some(stack) = creating.get_mut(&id) {
                if let Some(pos) = stack.iter().rposition(|n| n == name) {
                    stack.remove(pos);
                }
                if stack.is_empty() {
                    creating.remove(&id);
                }
            }
        }

        /// Gets a snapshot of this thread's creation stack, outermost bean first.
        pub fn current_creating(&self) -> Vec<String> {
            self.creating
                .lock()
                .get(&thread::current().id())
                .cloned()
                .unwrap_or_default()
        }
    }

    /// Dependency graph analysis result
    #[derive(Debug, PartialEq, Eq)]
    pub enum DependencyValidationError {
        /// Circular dependency detected
        CircularDependency {
            /// The dependency chain forming the cycle
            cycle: Vec<String>,
        },
        /// Missing dependency detected
        MissingDependency {
            /// The bean that requires the dependency
            bean: String,
            /// The missing dependency
            missing: String,
        },
    }

    impl std::fmt::Display for DependencyValidationError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self {
                Self::CircularDependency { cycle } => {
                    write!(f, "Circular dependency detected: {}", cycle.join(" -> "))
                }
                Self::MissingDependency { bean, missing } => {
                    write!(f, "Bean '{}' depends on '{}' which is not registered", bean, missing)
                }
            }
        }
    }

    /// Validates dependency graph for circular dependencies and missing beans
    ///
    /// `dependencies` maps a bean name to the bean names it declares as
    /// dependencies. Beans are visited in `order` so the first reported
    /// problem is stable across runs.
    pub fn validate_dependency_graph(
        order: &[String],
        dependencies: &HashMap<String, Vec<String>>,
    ) -> Result<(), DependencyValidationError> {
        for bean_name in order {
            let Some(deps) = dependencies.get(bean_name) else {
                continue;
            };
            for dep in deps {
                if !dependencies.contains_key(dep) {
                    return Err(DependencyValidationError::MissingDependency {
                        bean: bean_name.clone(),
                        missing: dep.clone(),
                    });
                }
            }
        }

        let mut visited = HashSet::new();
        let mut rec_stack = Vec::new();

        for bean_name in order {
            if !visited.contains(bean_name) {
                if let Some(cycle) =
                    detect_cycle_dfs(bean_name, dependencies, &mut visited, &mut rec_stack)
                {
                    return Err(DependencyValidationError::CircularDependency { cycle });
                }
            }
        }

        Ok(())
    }

    /// DFS-based cycle detection
    fn detect_cycle_dfs(
        node: &str,
        graph: &HashMap<String, Vec<String>>,
        visited: &mut HashSet<String>,
        rec_stack: &mut Vec<String>,
    ) -> Option<Vec<String>> {
        visited.insert(node.to_string());
        rec_stack.push(node.to_string());

        if let Some(deps) = graph.get(node) {
            for dep in deps {
                if let Some(start_idx) = rec_stack.iter().position(|x| x == dep) {
                    let mut cycle = rec_stack[start_idx..].to_vec();
                    cycle.push(dep.to_string());
                    return Some(cycle);
                }
                if !visited.contains(dep) {
                    if let Some(cycle) = detect_cycle_dfs(dep, graph, visited, rec_stack) {
                        return Some(cycle);
                    }
                }
            }
        }

        rec_stack.pop();
        None
    }
}
