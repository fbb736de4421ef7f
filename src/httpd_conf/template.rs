//! httpd.conf assembly
//!
//! The document is a fixed skeleton with two insertion points: module loads
//! after the core modules, and directives inside the document root's
//! `<Directory>` block. Each conditional section is a `(predicate, text)`
//! pair; sections are emitted in declaration order and never reordered, so
//! the same options always render the same bytes.

use super::options::ConfigOptions;

type Predicate = fn(&ConfigOptions) -> bool;

const HEADER: &str = r#"ServerRoot "${SERVER_ROOT}"

ServerName "0.0.0.0"

LoadModule mpm_event_module modules/mod_mpm_event.so
LoadModule log_config_module modules/mod_log_config.so
LoadModule mime_module modules/mod_mime.so
LoadModule dir_module modules/mod_dir.so
LoadModule authz_core_module modules/mod_authz_core.so
LoadModule unixd_module modules/mod_unixd.so
"#;

const REWRITE_MODULE: &str = "LoadModule rewrite_module modules/mod_rewrite.so\n";

const AUTOINDEX_MODULE: &str = "LoadModule autoindex_module modules/mod_autoindex.so\n";

const AUTH_MODULES: &str = "LoadModule authn_core_module modules/mod_authn_core.so
LoadModule authn_file_module modules/mod_authn_file.so
LoadModule authz_host_module modules/mod_authz_host.so
LoadModule authz_user_module modules/mod_authz_user.so
LoadModule access_compat_module modules/mod_access_compat.so
LoadModule auth_basic_module modules/mod_auth_basic.so
";

const PUSH_STATE_RULES: &str = "

  Options +FollowSymLinks
  IndexIgnore */*
  RewriteEngine On
  RewriteCond %{REQUEST_FILENAME} !-f
  RewriteCond %{REQUEST_FILENAME} !-d
  RewriteRule (.*) index.html";

const FORCE_HTTPS_RULES: &str = "

  RewriteEngine On
  RewriteCond %{HTTPS} !=on
  RewriteCond %{HTTP:X-Forwarded-Proto} !https [NC]
  RewriteRule ^ https://%{HTTP_HOST}%{REQUEST_URI} [L,R=301]";

const FOOTER: &str = r#"
</Directory>

<Files ".ht*">
  Require all denied
</Files>"#;

fn push_state(options: &ConfigOptions) -> bool {
    options.push_state
}

fn force_https(options: &ConfigOptions) -> bool {
    options.force_https
}

fn basic_auth(options: &ConfigOptions) -> bool {
    options.basic_auth_file.is_some()
}

/// Module loads, in order
const MODULE_SECTIONS: &[(Predicate, &str)] = &[
    (ConfigOptions::needs_rewrite, REWRITE_MODULE),
    (push_state, AUTOINDEX_MODULE),
    (basic_auth, AUTH_MODULES),
];

/// Static directives appended to the document root block, in order
const DIRECTORY_SECTIONS: &[(Predicate, &str)] = &[
    (push_state, PUSH_STATE_RULES),
    (force_https, FORCE_HTTPS_RULES),
];

/// Render the full document
pub fn render(options: &ConfigOptions) -> String {
    let root = options.web_server_root.display();
    let mut out = String::from(HEADER);

    for (applies, text) in MODULE_SECTIONS {
        if applies(options) {
            out.push_str(text);
        }
    }

    out.push_str(&format!(
        r#"
TypesConfig conf/mime.types

PidFile /tmp/httpd.pid

User nobody

Listen "${{PORT}}"

DocumentRoot "{root}"

DirectoryIndex index.html

ErrorLog /proc/self/fd/2

LogFormat "%h %l %u %t \"%r\" %>s %b" common
CustomLog /proc/self/fd/1 common

<Directory />
  AllowOverride None
  Require all denied
</Directory>

<Directory "{root}">
"#
    ));

    out.push_str(match options.basic_auth_file {
        Some(_) => "  Require valid-user",
        None => "  Require all granted",
    });

    for (applies, text) in DIRECTORY_SECTIONS {
        if applies(options) {
            out.push_str(text);
        }
    }

    if let Some(auth_file) = &options.basic_auth_file {
        out.push_str(&format!(
            r#"

  AuthType Basic
  AuthName "Authentication Required"
  AuthUserFile "{}"

  Order allow,deny
  Allow from all"#,
            auth_file.display()
        ));
    }

    out.push_str(FOOTER);
    out
}
