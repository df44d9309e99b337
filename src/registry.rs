use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use once_cell::sync::Lazy;

use crate::error::Error;
use crate::runtime::coerce::coerce;
use crate::runtime::value::Value;
use crate::syntax::token::{is_identifier, SourceLocation};
use crate::types::descriptor::TypeDesc;

/// A host object scripts can drive. `declare` lists the commands and
/// properties once per type; the resulting registry is cached process
/// wide and shared by every evaluation against that type.
pub trait Host: Sized + 'static {
    fn declare(decl: &mut Declarations<Self>);

    fn before_eval(&mut self) {}
    fn after_eval(&mut self) {}
}

// ─── Declarations ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub(crate) name: String,
    pub(crate) ty: TypeDesc,
    pub(crate) default: Option<Value>,
}

impl Param {
    pub fn new(name: &str, ty: TypeDesc) -> Self {
        Self { name: name.to_string(), ty, default: None }
    }

    /// Defaulted parameters may be omitted from named calls.
    pub fn with_default(name: &str, ty: TypeDesc, default: impl Into<Value>) -> Self {
        Self { name: name.to_string(), ty, default: Some(default.into()) }
    }
}

type Handler<H> = Box<dyn Fn(&mut H, Vec<Value>) -> Result<Value, String> + Send + Sync>;
type Setter<H> = Box<dyn Fn(&mut H, Value) -> Result<(), String> + Send + Sync>;

/// Collects a host type's surface. Handed to [`Host::declare`].
pub struct Declarations<H> {
    commands: Vec<Command<H>>,
    properties: Vec<Property<H>>,
}

impl<H: Host> Declarations<H> {
    fn new() -> Self {
        Self { commands: Vec::new(), properties: Vec::new() }
    }

    /// A command whose result can feed arguments, lists, and properties.
    /// The handler receives arguments already coerced, in declaration order.
    pub fn command<F>(&mut self, name: &str, params: &[Param], handler: F)
    where
        F: Fn(&mut H, Vec<Value>) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.commands.push(Command {
            name: name.to_string(),
            params: params.to_vec(),
            handler: Box::new(handler),
            is_void: false,
        });
    }

    /// A command evaluated for its effect; its result is void and may
    /// not be used as a value.
    pub fn void_command<F>(&mut self, name: &str, params: &[Param], handler: F)
    where
        F: Fn(&mut H, Vec<Value>) -> Result<(), String> + Send + Sync + 'static,
    {
        self.commands.push(Command {
            name: name.to_string(),
            params: params.to_vec(),
            handler: Box::new(move |host, args| handler(host, args).map(|()| Value::Void)),
            is_void: true,
        });
    }

    pub fn property<F>(&mut self, name: &str, ty: TypeDesc, setter: F)
    where
        F: Fn(&mut H, Value) -> Result<(), String> + Send + Sync + 'static,
    {
        self.properties.push(Property { name: name.to_string(), ty, setter: Box::new(setter) });
    }
}

// ─── Commands and properties ─────────────────────────────────────────────────

pub struct Command<H> {
    name: String,
    params: Vec<Param>,
    handler: Handler<H>,
    is_void: bool,
}

impl<H: Host> Command<H> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn is_void(&self) -> bool {
        self.is_void
    }

    /// Positional form: one argument per declared parameter, in order.
    pub fn invoke(
        &self,
        host: &mut H,
        args: Vec<(Value, SourceLocation)>,
        call: &SourceLocation,
    ) -> Result<Value, Error> {
        if args.len() != self.params.len() {
            let expected = self.params.len();
            let unit = if expected == 1 { "parameter" } else { "parameters" };
            return Err(Error::invocation(
                call,
                format!(
                    "Command '{}' takes {expected} {unit}, got {}",
                    self.name,
                    args.len()
                ),
            ));
        }

        let mut bound = Vec::with_capacity(args.len());
        for (index, (value, loc)) in args.into_iter().enumerate() {
            bound.push(self.coerce_param(index, value, &loc)?);
        }
        self.run(host, bound, call)
    }

    /// Named form: any subset of parameters in any order, defaults
    /// filling the gaps. Arguments are checked in script order.
    pub fn invoke_named(
        &self,
        host: &mut H,
        args: Vec<(String, Value, SourceLocation)>,
        call: &SourceLocation,
    ) -> Result<Value, Error> {
        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];

        for (name, value, loc) in args {
            let Some(index) = self.params.iter().position(|p| p.name == name) else {
                return Err(Error::resolution(
                    &loc,
                    format!("Unexpected parameter '{name}' for command '{}'", self.name),
                ));
            };
            if slots[index].is_some() {
                return Err(Error::invocation(
                    &loc,
                    format!("Duplicate parameter '{name}' for command '{}'", self.name),
                ));
            }
            slots[index] = Some(self.coerce_param(index, value, &loc)?);
        }

        let mut bound = Vec::with_capacity(self.params.len());
        for (slot, param) in slots.into_iter().zip(&self.params) {
            match slot {
                Some(value) => bound.push(value),
                // defaults were coerced at registration
                None => match &param.default {
                    Some(default) => bound.push(default.clone()),
                    None => {
                        return Err(Error::invocation(
                            call,
                            format!(
                                "Missing parameter '{}' for command '{}'",
                                param.name, self.name
                            ),
                        ));
                    }
                },
            }
        }
        self.run(host, bound, call)
    }

    fn coerce_param(&self, index: usize, value: Value, loc: &SourceLocation) -> Result<Value, Error> {
        let param = &self.params[index];
        coerce(value, &param.ty).map_err(|msg| {
            Error::coercion(
                loc,
                format!(
                    "Error in parsing parameter '{}' for command '{}': {msg}",
                    param.name, self.name
                ),
            )
        })
    }

    fn run(&self, host: &mut H, args: Vec<Value>, call: &SourceLocation) -> Result<Value, Error> {
        (self.handler)(host, args)
            .map_err(|msg| Error::invocation(call, format!("Error in command '{}': {msg}", self.name)))
    }
}

pub struct Property<H> {
    name: String,
    ty: TypeDesc,
    setter: Setter<H>,
}

impl<H: Host> Property<H> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &TypeDesc {
        &self.ty
    }

    pub fn set(&self, host: &mut H, value: Value, loc: &SourceLocation) -> Result<(), Error> {
        let coerced = coerce(value, &self.ty).map_err(|msg| {
            Error::coercion(loc, format!("Error in property '{}': {msg}", self.name))
        })?;
        (self.setter)(host, coerced)
            .map_err(|msg| Error::invocation(loc, format!("Error in property '{}': {msg}", self.name)))
    }
}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Immutable lookup tables for one host type, built from its
/// declarations and validated once.
pub struct Registry<H> {
    commands: HashMap<String, Command<H>>,
    properties: HashMap<String, Property<H>>,
}

impl<H> std::fmt::Debug for Registry<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("commands", &self.commands.keys())
            .field("properties", &self.properties.keys())
            .finish()
    }
}

static REGISTRIES: Lazy<RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>> =
    Lazy::new(Default::default);

impl<H: Host> Registry<H> {
    /// Returns the process-wide registry for `H`, building it on first
    /// use. Concurrent callers see the same instance; a failed build is
    /// not cached and is reported to every caller that triggers it.
    pub fn shared() -> Result<Arc<Self>, Error> {
        let key = TypeId::of::<H>();

        {
            let map = REGISTRIES.read().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = map.get(&key) {
                if let Ok(registry) = entry.clone().downcast::<Self>() {
                    return Ok(registry);
                }
            }
        }

        // the write lock doubles as the init barrier
        let mut map = REGISTRIES.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = map.get(&key) {
            if let Ok(registry) = entry.clone().downcast::<Self>() {
                return Ok(registry);
            }
        }
        let registry = Arc::new(Self::build()?);
        map.insert(key, registry.clone() as Arc<dyn Any + Send + Sync>);
        Ok(registry)
    }

    fn build() -> Result<Self, Error> {
        let mut decl = Declarations::new();
        H::declare(&mut decl);

        let mut commands = HashMap::with_capacity(decl.commands.len());
        for mut command in decl.commands {
            validate_command(&command)?;
            normalize_defaults(&mut command)?;
            if commands.contains_key(&command.name) {
                return Err(Error::registration(format!(
                    "command '{}' is declared twice",
                    command.name
                )));
            }
            commands.insert(command.name.clone(), command);
        }

        let mut properties = HashMap::with_capacity(decl.properties.len());
        for property in decl.properties {
            if !is_identifier(&property.name) {
                return Err(Error::registration(format!(
                    "property name '{}' is not a valid identifier",
                    property.name
                )));
            }
            property.ty.validate().map_err(|msg| {
                Error::registration(format!("property '{}': {msg}", property.name))
            })?;
            if properties.contains_key(&property.name) {
                return Err(Error::registration(format!(
                    "property '{}' is declared twice",
                    property.name
                )));
            }
            properties.insert(property.name.clone(), property);
        }

        Ok(Self { commands, properties })
    }

    pub fn find_command(&self, name: &str) -> Option<&Command<H>> {
        self.commands.get(name)
    }

    pub fn find_property(&self, name: &str) -> Option<&Property<H>> {
        self.properties.get(name)
    }
}

fn validate_command<H: Host>(command: &Command<H>) -> Result<(), Error> {
    if !is_identifier(&command.name) {
        return Err(Error::registration(format!(
            "command name '{}' is not a valid identifier",
            command.name
        )));
    }
    for (i, param) in command.params.iter().enumerate() {
        if !is_identifier(&param.name) {
            return Err(Error::registration(format!(
                "parameter name '{}' of command '{}' is not a valid identifier",
                param.name, command.name
            )));
        }
        if command.params[..i].iter().any(|p| p.name == param.name) {
            return Err(Error::registration(format!(
                "parameter '{}' of command '{}' is declared twice",
                param.name, command.name
            )));
        }
        param.ty.validate().map_err(|msg| {
            Error::registration(format!(
                "parameter '{}' of command '{}': {msg}",
                param.name, command.name
            ))
        })?;
    }
    Ok(())
}

/// Coerces declared defaults once so calls can clone them as-is.
fn normalize_defaults<H: Host>(command: &mut Command<H>) -> Result<(), Error> {
    for param in &mut command.params {
        if let Some(default) = param.default.take() {
            let coerced = coerce(default, &param.ty).map_err(|msg| {
                Error::registration(format!(
                    "default for parameter '{}' of command '{}': {msg}",
                    param.name, command.name
                ))
            })?;
            param.default = Some(coerced);
        }
    }
    Ok(())
}

/// Builds and caches the registry for `H` ahead of the first script,
/// surfacing declaration mistakes at startup.
pub fn preregister<H: Host>() -> Result<(), Error> {
    Registry::<H>::shared().map(|_| ())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
