//! Jython scripts run through `wsadmin -lang jython -f`

use crate::error::{Error, Result};
use crate::record::JdbcProvider;
use declarative::Ensure;

/// Line prefix the discovery script prints its answer with
pub const STATE_MARKER: &str = "jdbc_provider_state=";

/// Administrative scope a provider is managed at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope<'a> {
    Cell {
        cell: &'a str,
    },
    Node {
        cell: &'a str,
        node: &'a str,
    },
    Server {
        cell: &'a str,
        node: &'a str,
        server: &'a str,
    },
    Cluster {
        cell: &'a str,
        cluster: &'a str,
    },
}

impl<'a> Scope<'a> {
    /// Resolve the declared scope and the attributes it depends on
    pub fn of(provider: &'a JdbcProvider) -> Result<Self> {
        let scope = provider.scope.as_deref().unwrap_or_default();
        let needs = |field: &str, value: &'a Option<String>| -> Result<&'a str> {
            match value.as_deref() {
                None | Some("") => Err(Error::Scope {
                    message: format!("scope '{scope}' requires '{field}'"),
                }),
                Some(v) => path_segment(field, v),
            }
        };
        let cell = path_segment("cell", &provider.cell)?;

        match provider.scope.as_deref() {
            Some("cell") => Ok(Scope::Cell { cell }),
            Some("node") => Ok(Scope::Node {
                cell,
                node: needs("node", &provider.node)?,
            }),
            Some("server") => Ok(Scope::Server {
                cell,
                node: needs("node", &provider.node)?,
                server: needs("server", &provider.server)?,
            }),
            Some("cluster") => Ok(Scope::Cluster {
                cell,
                cluster: needs("cluster", &provider.cluster)?,
            }),
            Some(other) => Err(Error::Scope {
                message: format!(
                    "unknown scope '{other}', expected one of: cell, node, server, cluster"
                ),
            }),
            None => Err(Error::Scope {
                message: "scope is not set".to_string(),
            }),
        }
    }

    /// Configuration containment path, e.g. `/Cell:C/Node:N/`
    pub fn containment_path(&self) -> String {
        match self {
            Scope::Cell { cell } => format!("/Cell:{cell}/"),
            Scope::Node { cell, node } => format!("/Cell:{cell}/Node:{node}/"),
            Scope::Server { cell, node, server } => {
                format!("/Cell:{cell}/Node:{node}/Server:{server}/")
            }
            Scope::Cluster { cell, cluster } => format!("/Cell:{cell}/ServerCluster:{cluster}/"),
        }
    }

    /// Start of the configuration id of objects defined directly at this
    /// scope, e.g. `(cells/C/nodes/N|`
    ///
    /// `getid` on a containment path also returns objects of narrower scopes
    /// beneath it, so its results are filtered on this prefix.
    pub fn config_id_prefix(&self) -> String {
        let path = match self {
            Scope::Cell { cell } => format!("cells/{cell}"),
            Scope::Node { cell, node } => format!("cells/{cell}/nodes/{node}"),
            Scope::Server { cell, node, server } => {
                format!("cells/{cell}/nodes/{node}/servers/{server}")
            }
            Scope::Cluster { cell, cluster } => format!("cells/{cell}/clusters/{cluster}"),
        };
        format!("({path}|")
    }

    /// Value of the `-scope` argument of `AdminTask.createJDBCProvider`
    pub fn task_scope(&self) -> String {
        match self {
            Scope::Cell { cell } => format!("Cell={cell}"),
            Scope::Node { cell, node } => format!("Cell={cell},Node={node}"),
            Scope::Server { cell, node, server } => {
                format!("Cell={cell},Node={node},Server={server}")
            }
            Scope::Cluster { cell, cluster } => format!("Cell={cell},Cluster={cluster}"),
        }
    }
}

/// Render a value as a Jython string literal
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Value placed into a containment path segment
///
/// Empty values and separators would widen the path into a wildcard.
fn path_segment<'v>(field: &str, value: &'v str) -> Result<&'v str> {
    if value.is_empty() {
        return Err(Error::Scope {
            message: format!("'{field}' must not be empty"),
        });
    }
    if value.contains(['/', ':']) {
        return Err(Error::Scope {
            message: format!("'{field}' must not contain '/' or ':', found '{value}'"),
        });
    }
    Ok(value)
}

/// Jython binding `providers` to the ids of this provider at its own scope
fn lookup(provider: &JdbcProvider) -> Result<String> {
    let scope = Scope::of(provider)?;
    let name = path_segment("name", &provider.name)?;
    let path = quote(&format!("{}JDBCProvider:{name}/", scope.containment_path()));
    let prefix = quote(&scope.config_id_prefix());
    Ok(format!(
        "candidates = AdminConfig.getid({path}).splitlines()\n\
         providers = [p for p in candidates if p.find({prefix}) >= 0]\n"
    ))
}

/// Script printing whether the provider exists
pub fn discover(provider: &JdbcProvider) -> Result<String> {
    let lookup = lookup(provider)?;
    Ok(format!(
        "{lookup}\
         if providers:\n\
         \x20   print '{STATE_MARKER}present'\n\
         else:\n\
         \x20   print '{STATE_MARKER}absent'\n"
    ))
}

/// Script creating the provider and saving the configuration
pub fn create(provider: &JdbcProvider) -> Result<String> {
    let scope = Scope::of(provider)?;
    path_segment("name", &provider.name)?;

    let mut args: Vec<(&str, &str)> = Vec::new();
    let scope_arg = scope.task_scope();
    args.push(("-scope", scope_arg.as_str()));
    let optional = [
        ("-databaseType", &provider.dbtype),
        ("-providerType", &provider.providertype),
        ("-implementationType", &provider.implementation),
    ];
    args.extend(
        optional
            .iter()
            .filter_map(|(flag, value)| value.as_deref().map(|v| (*flag, v))),
    );
    args.push(("-name", provider.name.as_str()));
    let trailing = [
        ("-description", &provider.description),
        ("-classpath", &provider.classpath),
        ("-nativePath", &provider.nativepath),
    ];
    args.extend(
        trailing
            .iter()
            .filter_map(|(flag, value)| value.as_deref().map(|v| (*flag, v))),
    );

    let mut script = String::from("AdminTask.createJDBCProvider([\n");
    for (flag, value) in args {
        script.push_str(&format!("    {}, {},\n", quote(flag), quote(value)));
    }
    script.push_str("])\nAdminConfig.save()\n");
    Ok(script)
}

/// Script removing the provider and saving the configuration
///
/// Only the provider defined at the declared scope is removed.
pub fn destroy(provider: &JdbcProvider) -> Result<String> {
    let lookup = lookup(provider)?;
    Ok(format!(
        "{lookup}\
         for provider in providers:\n\
         \x20   AdminConfig.remove(provider)\n\
         if providers:\n\
         \x20   AdminConfig.save()\n"
    ))
}

/// Read the discovery answer out of wsadmin output
pub fn parse_state(stdout: &str) -> Option<Ensure> {
    stdout
        .lines()
        .filter_map(|l| l.trim().strip_prefix(STATE_MARKER))
        .find_map(|state| state.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Attributes;

    fn provider(extra: &[(&str, &str)]) -> JdbcProvider {
        let mut attributes: Attributes = [
            ("dmgr_profile", "Dmgr01"),
            ("profile_base", "/opt/IBM/WebSphere/AppServer/profiles"),
            ("cell", "CELL01"),
        ]
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
        for (k, v) in extra {
            attributes.insert((*k).to_string(), (*v).to_string());
        }
        JdbcProvider::build("oracleJDBC", &attributes).unwrap()
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(quote("plain"), "'plain'");
        assert_eq!(quote("it's"), r"'it\'s'");
        assert_eq!(quote(r"C:\drivers"), r"'C:\\drivers'");
        assert_eq!(quote("a\nb"), r"'a\nb'");
        assert_eq!(quote("\u{7}"), r"'\x07'");
        assert_eq!(quote("${ORACLE_JDBC_DRIVER_PATH}"), "'${ORACLE_JDBC_DRIVER_PATH}'");
    }

    #[test]
    fn test_containment_paths() {
        let cell = provider(&[("scope", "cell")]);
        assert_eq!(Scope::of(&cell).unwrap().containment_path(), "/Cell:CELL01/");

        let node = provider(&[("scope", "node"), ("node", "N1")]);
        assert_eq!(
            Scope::of(&node).unwrap().containment_path(),
            "/Cell:CELL01/Node:N1/"
        );

        let server = provider(&[("scope", "server"), ("node", "N1"), ("server", "S1")]);
        assert_eq!(
            Scope::of(&server).unwrap().containment_path(),
            "/Cell:CELL01/Node:N1/Server:S1/"
        );
        assert_eq!(
            Scope::of(&server).unwrap().task_scope(),
            "Cell=CELL01,Node=N1,Server=S1"
        );

        let cluster = provider(&[("scope", "cluster"), ("cluster", "C1")]);
        assert_eq!(
            Scope::of(&cluster).unwrap().containment_path(),
            "/Cell:CELL01/ServerCluster:C1/"
        );
    }

    #[test]
    fn test_incomplete_scope_is_error() {
        let server = provider(&[("scope", "server"), ("node", "N1")]);
        let err = Scope::of(&server).unwrap_err();
        assert!(err.to_string().contains("requires 'server'"));

        let missing = provider(&[]);
        assert!(Scope::of(&missing).is_err());

        let unknown = provider(&[("scope", "galaxy")]);
        assert!(Scope::of(&unknown).unwrap_err().to_string().contains("galaxy"));
    }

    #[test]
    fn test_empty_scope_values_are_rejected() {
        let node = provider(&[("scope", "node"), ("node", "")]);
        let err = Scope::of(&node).unwrap_err();
        assert!(err.to_string().contains("requires 'node'"));
        assert!(destroy(&node).is_err());

        let server = provider(&[("scope", "server"), ("node", "N1"), ("server", "")]);
        assert!(Scope::of(&server).is_err());

        let cluster = provider(&[("scope", "cluster"), ("cluster", "")]);
        assert!(Scope::of(&cluster).is_err());
    }

    #[test]
    fn test_separators_in_path_values_are_rejected() {
        let node = provider(&[("scope", "node"), ("node", "N1/Server:S1")]);
        let err = Scope::of(&node).unwrap_err();
        assert!(err.to_string().contains("'node' must not contain"));

        let cluster = provider(&[("scope", "cluster"), ("cluster", "C:1")]);
        assert!(Scope::of(&cluster).is_err());

        let mut named = provider(&[("scope", "cell")]);
        named.name = "ora/JDBCProvider:db2".to_string();
        for script in [discover(&named), create(&named), destroy(&named)] {
            let err = script.unwrap_err();
            assert!(err.to_string().contains("'name' must not contain"));
        }
    }

    #[test]
    fn test_config_id_prefixes() {
        let prefix = |extra: &[(&str, &str)]| {
            Scope::of(&provider(extra)).unwrap().config_id_prefix()
        };
        assert_eq!(prefix(&[("scope", "cell")]), "(cells/CELL01|");
        assert_eq!(
            prefix(&[("scope", "node"), ("node", "N1")]),
            "(cells/CELL01/nodes/N1|"
        );
        assert_eq!(
            prefix(&[("scope", "server"), ("node", "N1"), ("server", "S1")]),
            "(cells/CELL01/nodes/N1/servers/S1|"
        );
        assert_eq!(
            prefix(&[("scope", "cluster"), ("cluster", "C1")]),
            "(cells/CELL01/clusters/C1|"
        );
    }

    #[test]
    fn test_discover_script() {
        let script = discover(&provider(&[("scope", "cell")])).unwrap();
        assert!(script.contains("AdminConfig.getid('/Cell:CELL01/JDBCProvider:oracleJDBC/')"));
        assert!(script.contains("if p.find('(cells/CELL01|') >= 0]"));
        assert!(script.contains("if providers:\n    print 'jdbc_provider_state=present'"));
    }

    #[test]
    fn test_create_script_includes_flags() {
        let script = create(&provider(&[
            ("scope", "cell"),
            ("dbtype", "Oracle"),
            ("providertype", "Oracle JDBC Driver"),
            ("implementation", "Connection pool data source"),
            ("classpath", "${ORACLE_JDBC_DRIVER_PATH}/ojdbc6.jar"),
            ("nativepath", ""),
        ]))
        .unwrap();

        assert!(script.starts_with("AdminTask.createJDBCProvider([\n"));
        assert!(script.contains("'-scope', 'Cell=CELL01'"));
        assert!(script.contains("'-databaseType', 'Oracle'"));
        assert!(script.contains("'-providerType', 'Oracle JDBC Driver'"));
        assert!(script.contains("'-implementationType', 'Connection pool data source'"));
        assert!(script.contains("'-name', 'oracleJDBC'"));
        assert!(script.contains("'-classpath', '${ORACLE_JDBC_DRIVER_PATH}/ojdbc6.jar'"));
        assert!(script.contains("'-nativePath', ''"));
        assert!(!script.contains("-description"));
        assert!(script.ends_with("AdminConfig.save()\n"));
    }

    #[test]
    fn test_hostile_values_stay_inside_literals() {
        let script = create(&provider(&[
            ("scope", "cell"),
            ("description", "x'); AdminConfig.reset(); ('"),
        ]))
        .unwrap();
        assert!(script.contains(r"'-description', 'x\'); AdminConfig.reset(); (\''"));
    }

    #[test]
    fn test_destroy_script() {
        let script = destroy(&provider(&[("scope", "node"), ("node", "N1")])).unwrap();
        assert!(script.contains("'/Cell:CELL01/Node:N1/JDBCProvider:oracleJDBC/'"));
        assert!(script.contains("if p.find('(cells/CELL01/nodes/N1|') >= 0]"));
        assert!(script.contains("for provider in providers:\n    AdminConfig.remove(provider)"));
        assert!(script.ends_with("if providers:\n    AdminConfig.save()\n"));
    }

    #[test]
    fn test_parse_state() {
        let out = "WASX7209I: Connected to process \"dmgr\"\njdbc_provider_state=present\n";
        assert_eq!(parse_state(out), Some(Ensure::Present));
        assert_eq!(parse_state("jdbc_provider_state=absent"), Some(Ensure::Absent));
        assert_eq!(parse_state("WASX7209I: Connected"), None);
        assert_eq!(parse_state("jdbc_provider_state=maybe"), None);
    }
}
